//! Collapsers: edge drawers that slide a frame in and out.
//!
//! A collapser always sits in one slot of a drawer splitter whose other slot
//! holds the rest of the layout. Collapsing parks the splitter divider at the
//! closed end so only the tab strip is allocated; expanding slides it back to
//! the open size.

use dockyard_core::geometry::{Rect, SizeBox};

use crate::node::{DockEdge, NodeBehavior, NodeId, PanelId};
use crate::tree::DockTree;

#[derive(Debug, Clone, PartialEq)]
pub struct Collapser {
    pub(crate) frame: NodeId,
    pub(crate) edge: DockEdge,
    pub(crate) expanded: bool,
    /// Open extent along the edge axis; `None` derives it from the panels.
    pub(crate) open_size: Option<f64>,
    /// Panel that was active when the drawer last collapsed.
    pub(crate) last_active: Option<PanelId>,
}

impl Collapser {
    pub(crate) fn new(frame: NodeId, edge: DockEdge) -> Self {
        Self {
            frame,
            edge,
            expanded: false,
            open_size: None,
            last_active: None,
        }
    }

    #[must_use]
    pub const fn frame(&self) -> NodeId {
        self.frame
    }

    #[must_use]
    pub const fn edge(&self) -> DockEdge {
        self.edge
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub const fn open_size(&self) -> Option<f64> {
        self.open_size
    }

    /// Divider fraction of the drawer splitter when collapsed.
    #[must_use]
    pub const fn closed_position(&self) -> f64 {
        if self.edge.collapser_first() { 0.0 } else { 1.0 }
    }

    /// Divider fraction that gives the drawer `open` pixels of `extent`.
    #[must_use]
    pub fn open_position(&self, open: f64, extent: f64) -> f64 {
        let fraction = if extent > 0.0 {
            (open / extent).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.edge.collapser_first() {
            fraction
        } else {
            1.0 - fraction
        }
    }

    /// Open size, falling back to the largest desired panel extent along the
    /// edge axis.
    #[must_use]
    pub fn effective_open_size(&self, tree: &DockTree) -> f64 {
        if let Some(size) = self.open_size {
            return size;
        }
        let orientation = self.edge.orientation();
        tree.node(self.frame)
            .and_then(|node| node.kind().as_frame())
            .map(|frame| {
                frame
                    .panels()
                    .iter()
                    .filter_map(|id| tree.panel(*id))
                    .map(|panel| orientation.primary(panel.desired_size))
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0)
    }

    /// Split the collapser rectangle into the tab strip and the frame area.
    ///
    /// The strip sits against the outer edge. A collapsed drawer gives the
    /// frame an empty rectangle on the strip's inner side.
    #[must_use]
    pub fn partition(&self, rect: Rect, strip: f64) -> (Rect, Rect) {
        let strip = strip.clamp(0.0, self.edge.orientation().extent(rect));
        let (strip_rect, rest) = match self.edge {
            DockEdge::Left => (
                Rect::new(rect.x, rect.y, strip, rect.height),
                Rect::new(rect.x + strip, rect.y, rect.width - strip, rect.height),
            ),
            DockEdge::Right => (
                Rect::new(rect.right() - strip, rect.y, strip, rect.height),
                Rect::new(rect.x, rect.y, rect.width - strip, rect.height),
            ),
            DockEdge::Bottom => (
                Rect::new(rect.x, rect.bottom() - strip, rect.width, strip),
                Rect::new(rect.x, rect.y, rect.width, rect.height - strip),
            ),
        };
        if self.expanded {
            return (strip_rect, rest);
        }
        let parked = match self.edge {
            DockEdge::Left => Rect::new(strip_rect.right(), rect.y, 0.0, rect.height),
            DockEdge::Right => Rect::new(strip_rect.x, rect.y, 0.0, rect.height),
            DockEdge::Bottom => Rect::new(rect.x, strip_rect.y, rect.width, 0.0),
        };
        (strip_rect, parked)
    }
}

impl NodeBehavior for Collapser {
    /// The strip along the edge axis; the frame's cross-axis minimum.
    fn min_size(&self, tree: &DockTree) -> SizeBox {
        let orientation = self.edge.orientation();
        let cross = tree
            .node(self.frame)
            .map(|node| orientation.cross(node.min_size(tree)))
            .unwrap_or(0.0);
        orientation.compose(tree.config().collapser_strip_size, cross)
    }

    /// Exactly the strip while collapsed, unbounded once expanded.
    fn max_size(&self, tree: &DockTree) -> SizeBox {
        let orientation = self.edge.orientation();
        let primary = if self.expanded {
            f64::INFINITY
        } else {
            tree.config().collapser_strip_size
        };
        orientation.compose(primary, f64::INFINITY)
    }

    fn child_nodes(&self) -> Vec<NodeId> {
        vec![self.frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapser(edge: DockEdge) -> Collapser {
        Collapser::new(NodeId::MIN, edge)
    }

    #[test]
    fn closed_and_open_positions_mirror_by_edge() {
        let left = collapser(DockEdge::Left);
        assert_eq!(left.closed_position(), 0.0);
        assert_eq!(left.open_position(240.0, 1200.0), 0.2);

        let right = collapser(DockEdge::Right);
        assert_eq!(right.closed_position(), 1.0);
        assert!((right.open_position(240.0, 1200.0) - 0.8).abs() < 1e-12);

        let bottom = collapser(DockEdge::Bottom);
        assert_eq!(bottom.closed_position(), 1.0);
        assert_eq!(bottom.open_position(10.0, 0.0), 1.0);
    }

    #[test]
    fn collapsed_partition_parks_frame_behind_strip() {
        let rect = Rect::new(0.0, 0.0, 28.0, 400.0);
        let (strip, frame) = collapser(DockEdge::Left).partition(rect, 28.0);
        assert_eq!(strip, Rect::new(0.0, 0.0, 28.0, 400.0));
        assert!(frame.is_empty());
        assert_eq!(frame.x, 28.0);
    }

    #[test]
    fn expanded_partition_gives_frame_the_rest() {
        let mut drawer = collapser(DockEdge::Bottom);
        drawer.expanded = true;
        let rect = Rect::new(0.0, 300.0, 800.0, 200.0);
        let (strip, frame) = drawer.partition(rect, 28.0);
        assert_eq!(strip, Rect::new(0.0, 472.0, 800.0, 28.0));
        assert_eq!(frame, Rect::new(0.0, 300.0, 800.0, 172.0));
    }
}
