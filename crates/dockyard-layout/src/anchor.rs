//! Drag target resolution.
//!
//! Given a pointer position during a drag, decide which frame and edge the
//! user means to dock against. Rules are tried in priority order and the
//! first match wins:
//!
//! 1. the dragged frame's own title band, when it has several tabs
//!    (reorder within the frame);
//! 2. any frame's title band, topmost first (stack as a tab);
//! 3. the outer edges of the main region (split the whole region);
//! 4. the edges of the topmost frame under the pointer (split that frame);
//! 5. nothing: the drop floats.
//!
//! Modal frames hide every frame beneath the topmost modal one.

use dockyard_core::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{AnchorBand, DockConfig};
use crate::frame::{insertion_slot, tab_at};
use crate::node::{DockLocation, NodeId, TabOrientation};
use crate::tree::DockTree;

/// Resolved drop target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub location: DockLocation,
    /// Target node; `None` docks against the whole main region.
    pub target: Option<NodeId>,
    /// Ghost rectangle previewing the drop.
    pub rect: Rect,
    pub tab_orientation: Option<TabOrientation>,
    pub tab_index: Option<usize>,
    /// Dropping here would not change the layout structurally.
    pub is_self: bool,
}

/// A frame the pointer may hit, with everything the detector needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCandidate {
    pub frame: NodeId,
    pub rect: Rect,
    pub title_visible: bool,
    pub tab_orientation: TabOrientation,
    pub tab_count: usize,
    /// Stacking order; higher is on top.
    pub z: u32,
    pub floating: bool,
    pub modal: bool,
    /// Frame accepts panel-relative splits.
    pub split_allowed: bool,
}

/// Inputs for one anchor search.
#[derive(Debug, Clone, Copy)]
pub struct AnchorQuery<'a> {
    pub pointer: Point,
    /// Frame being dragged (for self-stacking), if any.
    pub source_frame: Option<NodeId>,
    pub candidates: &'a [FrameCandidate],
    pub main_region: Option<Rect>,
    pub allow_split: bool,
}

/// Stateless anchor resolver configured from [`DockConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorDetector {
    title_bar_size: f64,
    edge_band: AnchorBand,
    panel_band: AnchorBand,
    edge_docking: bool,
    tab_reorientation: bool,
}

impl Default for AnchorDetector {
    fn default() -> Self {
        Self::new(&DockConfig::default())
    }
}

impl AnchorDetector {
    #[must_use]
    pub fn new(config: &DockConfig) -> Self {
        Self {
            title_bar_size: config.title_bar_size,
            edge_band: config.edge_anchor_band,
            panel_band: config.panel_anchor_band,
            edge_docking: config.edge_docking,
            tab_reorientation: config.tab_reorientation,
        }
    }

    /// Resolve the anchor under the pointer, or `None` for a floating drop.
    #[must_use]
    pub fn detect(&self, query: &AnchorQuery<'_>) -> Option<Anchor> {
        let mut visible: Vec<&FrameCandidate> = query.candidates.iter().collect();
        if let Some(floor) = visible.iter().filter(|c| c.modal).map(|c| c.z).max() {
            visible.retain(|c| c.z >= floor);
        }
        visible.sort_by(|a, b| b.z.cmp(&a.z));
        let pointer = query.pointer;
        let topmost = visible.iter().copied().find(|c| c.rect.contains(pointer));

        if let Some(anchor) = self.self_stack(query, &visible) {
            trace!(target: "dockyard.anchor", ?anchor, "self stack");
            return Some(anchor);
        }
        if let Some(anchor) = self.title_stack(pointer, &visible) {
            trace!(target: "dockyard.anchor", ?anchor, "title band");
            return Some(anchor);
        }
        let over_floating = topmost.is_some_and(|c| c.floating || c.modal);
        if query.allow_split && !over_floating {
            if let Some(anchor) = self.outer_edge(pointer, query.main_region) {
                trace!(target: "dockyard.anchor", ?anchor, "outer edge");
                return Some(anchor);
            }
            if let Some(candidate) = topmost
                && let Some(anchor) = self.frame_split(pointer, candidate)
            {
                trace!(target: "dockyard.anchor", ?anchor, "frame split");
                return Some(anchor);
            }
        }
        trace!(target: "dockyard.anchor", x = pointer.x, y = pointer.y, "no anchor");
        None
    }

    fn bands(&self, candidate: &FrameCandidate) -> Vec<TabOrientation> {
        if !candidate.title_visible {
            return Vec::new();
        }
        let mut bands = vec![candidate.tab_orientation];
        if self.tab_reorientation {
            bands.extend(
                TabOrientation::ALL
                    .into_iter()
                    .filter(|o| *o != candidate.tab_orientation),
            );
        }
        bands
    }

    fn self_stack(&self, query: &AnchorQuery<'_>, visible: &[&FrameCandidate]) -> Option<Anchor> {
        let source = query.source_frame?;
        let candidate = visible.iter().find(|c| c.frame == source)?;
        if candidate.tab_count <= 1 || !candidate.title_visible {
            return None;
        }
        let orientation = candidate.tab_orientation;
        let band = orientation.band(candidate.rect, self.title_bar_size);
        if !band.contains(query.pointer) {
            return None;
        }
        Some(Anchor {
            location: DockLocation::Stacked,
            target: Some(source),
            rect: band,
            tab_orientation: Some(orientation),
            tab_index: Some(tab_at(band, orientation, query.pointer, candidate.tab_count)),
            is_self: true,
        })
    }

    fn title_stack(&self, pointer: Point, visible: &[&FrameCandidate]) -> Option<Anchor> {
        for candidate in visible {
            for orientation in self.bands(candidate) {
                let band = orientation.band(candidate.rect, self.title_bar_size);
                if band.contains(pointer) {
                    return Some(Anchor {
                        location: DockLocation::Stacked,
                        target: Some(candidate.frame),
                        rect: candidate.rect,
                        tab_orientation: Some(orientation),
                        tab_index: Some(insertion_slot(
                            band,
                            orientation,
                            pointer,
                            candidate.tab_count,
                        )),
                        is_self: false,
                    });
                }
            }
            // Anything below is covered by this frame.
            if candidate.rect.contains(pointer) {
                return None;
            }
        }
        None
    }

    fn outer_edge(&self, pointer: Point, region: Option<Rect>) -> Option<Anchor> {
        if !self.edge_docking {
            return None;
        }
        let region = region?;
        if !region.contains(pointer) {
            return None;
        }
        let band_x = self.edge_band.resolve(region.width);
        let band_y = self.edge_band.resolve(region.height);
        let distances = [
            (DockLocation::Left, pointer.x - region.left(), band_x),
            (DockLocation::Right, region.right() - pointer.x, band_x),
            (DockLocation::Top, pointer.y - region.top(), band_y),
            (DockLocation::Bottom, region.bottom() - pointer.y, band_y),
        ];
        // Strict comparison keeps the earlier edge on ties.
        let (location, _, _) = distances
            .into_iter()
            .filter(|(_, distance, band)| *distance < *band)
            .fold(None, |best: Option<(DockLocation, f64, f64)>, entry| match best {
                Some(current) if current.1 <= entry.1 => Some(current),
                _ => Some(entry),
            })?;
        Some(Anchor {
            location,
            target: None,
            rect: ghost_rect(region, location),
            tab_orientation: None,
            tab_index: None,
            is_self: false,
        })
    }

    fn frame_split(&self, pointer: Point, candidate: &FrameCandidate) -> Option<Anchor> {
        if !candidate.split_allowed || candidate.floating || candidate.modal {
            return None;
        }
        let rect = candidate.rect;
        let band_x = self.panel_band.resolve(rect.width);
        let band_y = self.panel_band.resolve(rect.height);
        let horizontal = [
            (DockLocation::Left, pointer.x - rect.left() < band_x),
            (DockLocation::Right, rect.right() - pointer.x < band_x),
        ];
        let vertical = [
            (DockLocation::Top, pointer.y - rect.top() < band_y),
            (DockLocation::Bottom, rect.bottom() - pointer.y < band_y),
        ];
        let order: [(DockLocation, bool); 4] = if rect.width < rect.height {
            [vertical[0], vertical[1], horizontal[0], horizontal[1]]
        } else {
            [horizontal[0], horizontal[1], vertical[0], vertical[1]]
        };
        let (location, _) = order.into_iter().find(|(_, hit)| *hit)?;
        Some(Anchor {
            location,
            target: Some(candidate.frame),
            rect: ghost_rect(rect, location),
            tab_orientation: None,
            tab_index: None,
            is_self: false,
        })
    }
}

/// Half of `rect` on the side a split location docks to.
#[must_use]
pub fn ghost_rect(rect: Rect, location: DockLocation) -> Rect {
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    match location {
        DockLocation::Left => Rect::new(rect.x, rect.y, half_w, rect.height),
        DockLocation::Right => Rect::new(rect.right() - half_w, rect.y, half_w, rect.height),
        DockLocation::Top => Rect::new(rect.x, rect.y, rect.width, half_h),
        DockLocation::Bottom => Rect::new(rect.x, rect.bottom() - half_h, rect.width, half_h),
        DockLocation::Stacked | DockLocation::Float | DockLocation::Modal => rect,
    }
}

impl DockTree {
    /// Hit-testable frames from the last solve: docked frames, expanded
    /// drawer frames, then floating and modal frames in z order.
    #[must_use]
    pub fn anchor_candidates(&self) -> Vec<FrameCandidate> {
        let floating_base = 2;
        let modal_base = floating_base + self.floating().len() as u32;
        self.frames()
            .into_iter()
            .filter_map(|id| {
                let node = self.node(id)?;
                let frame = node.kind().as_frame()?;
                if node.rect().is_empty() || self.is_collapsed_frame(id) {
                    return None;
                }
                let drawer = self.is_drawer_frame(id);
                let z = if frame.is_modal() {
                    modal_base + self.modal().iter().position(|f| *f == id)? as u32
                } else if frame.is_floating() {
                    floating_base + self.floating().iter().position(|f| *f == id)? as u32
                } else if drawer {
                    1
                } else {
                    0
                };
                Some(FrameCandidate {
                    frame: id,
                    rect: node.rect(),
                    title_visible: frame.shows_title(),
                    tab_orientation: frame.tab_orientation(),
                    tab_count: frame.panels().len(),
                    z,
                    floating: frame.is_floating(),
                    modal: frame.is_modal(),
                    split_allowed: !drawer && !frame.is_floating(),
                })
            })
            .collect()
    }

    /// Main region rectangle from the last solve.
    #[must_use]
    pub fn main_region_rect(&self) -> Option<Rect> {
        self.main_root()
            .and_then(|id| self.node(id))
            .map(|node| node.rect())
    }
}
