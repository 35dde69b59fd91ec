//! Constraint solving.
//!
//! Sizing flows two ways: minimum and maximum sizes propagate up from panels
//! through frames, collapsers and splitters, and rectangles flow down from the
//! layout area, each splitter clamping its divider into the feasible interval
//! of its two children. Floating frames keep their own rectangles.

use dockyard_core::geometry::{Rect, SizeBox};
use tracing::{debug, debug_span};

use crate::event::LayoutEvent;
use crate::node::{NodeBehavior, NodeId, NodeKind};
use crate::splitter::{SideBounds, resolve_position};
use crate::tree::DockTree;

/// Summary of one solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveReport {
    /// Nodes placed.
    pub placed: usize,
    /// Splitters whose children's minimums did not fit.
    pub overflowed: Vec<NodeId>,
}

impl DockTree {
    /// Minimum and maximum size of a node.
    #[must_use]
    pub fn size_bounds(&self, id: NodeId) -> Option<(SizeBox, SizeBox)> {
        let node = self.node(id)?;
        Some((node.min_size(self), node.max_size(self)))
    }

    /// Minimum size of the whole docked layout.
    #[must_use]
    pub fn min_size(&self) -> SizeBox {
        self.root()
            .and_then(|root| self.size_bounds(root))
            .map_or(SizeBox::ZERO, |(min, _)| min)
    }

    /// Lay the tree out into [`DockTree::area`], emitting geometry events
    /// for every rectangle that changed.
    pub fn solve(&mut self) -> SolveReport {
        let area = self.area();
        let span = debug_span!(target: "dockyard.tree", "solve", width = area.width, height = area.height);
        let _guard = span.enter();

        let mut report = SolveReport::default();
        self.bars.clear();
        if let Some(root) = self.root() {
            self.place(root, area, &mut report);
        }
        let floating: Vec<NodeId> = self
            .floating()
            .iter()
            .chain(self.modal().iter())
            .copied()
            .collect();
        for frame in floating {
            let rect = self.node(frame).map(|n| n.rect()).unwrap_or_default();
            self.place(frame, rect, &mut report);
        }
        debug!(
            target: "dockyard.tree",
            placed = report.placed,
            overflowed = report.overflowed.len(),
            "layout solved"
        );
        report
    }

    fn place(&mut self, id: NodeId, rect: Rect, report: &mut SolveReport) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let moved = node.rect != rect;
        node.rect = rect;
        report.placed += 1;
        if moved {
            self.emit(LayoutEvent::NodeGeometry { node: id, rect });
        }

        let Some(node) = self.node(id) else {
            return;
        };
        match node.kind().clone() {
            NodeKind::Splitter(splitter) => {
                let side = |child: Option<NodeId>| {
                    child
                        .and_then(|c| self.size_bounds(c))
                        .map_or(SideBounds::OPEN, |(min, max)| SideBounds { min, max })
                };
                let first = side(splitter.first());
                let second = side(splitter.second());
                let bar = splitter.bar_size(self.config().splitter_size);
                let resolution = resolve_position(
                    splitter.orientation(),
                    rect,
                    splitter.position(),
                    first,
                    second,
                    bar,
                );
                if resolution.overflow {
                    report.overflowed.push(id);
                }
                if splitter.drawer().is_none() {
                    self.bars.insert(id, resolution.bar);
                }
                if let Some(child) = splitter.first() {
                    self.place(child, resolution.first, report);
                }
                if let Some(child) = splitter.second() {
                    self.place(child, resolution.second, report);
                }
            }
            NodeKind::Collapser(collapser) => {
                let (_, frame_rect) =
                    collapser.partition(rect, self.config().collapser_strip_size);
                self.place(collapser.frame(), frame_rect, report);
            }
            NodeKind::Frame(frame) => {
                let thickness = frame.title_thickness(self.config().title_bar_size);
                let content = frame.tab_orientation().content(rect, thickness);
                for panel in frame.panels() {
                    let Some(p) = self.panels.get_mut(panel) else {
                        continue;
                    };
                    let size = content.size();
                    if moved || p.last_size != Some(size) {
                        p.last_size = Some(size);
                        self.emit(LayoutEvent::PanelGeometry {
                            panel: *panel,
                            rect: content,
                        });
                    }
                }
            }
        }
    }
}
