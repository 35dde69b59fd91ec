//! Outbound notifications.
//!
//! The engine never calls back into the host. Every observable change is
//! queued as a [`LayoutEvent`] and drained by the host after it feeds input
//! or calls a mutation.

use dockyard_core::geometry::Rect;

use crate::anchor::Anchor;
use crate::node::{NodeId, PanelId};

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// A container was laid out at a new rectangle.
    NodeGeometry { node: NodeId, rect: Rect },
    /// A panel's content area changed.
    PanelGeometry { panel: PanelId, rect: Rect },
    VisibilityChanged { panel: PanelId, visible: bool },
    TabChanged { frame: NodeId, active: Option<usize> },
    FocusChanged { panel: Option<PanelId> },
    /// Drop preview for the drag in progress; `None` clears it.
    GhostPreview { anchor: Option<Anchor> },
    PanelCreated(PanelId),
    PanelDestroyed(PanelId),
    /// A persistent panel was removed from the layout but kept for reuse.
    PanelRetained(PanelId),
}
