//! Node identity, the closed node sum type, and the shared enums that describe
//! where things dock.
//!
//! Every container lives in the tree arena keyed by [`NodeId`]; parent and
//! child links are ids, never owning pointers. Panels live in a separate arena
//! keyed by [`PanelId`] and point back at their frame by id.

use std::fmt;

use dockyard_core::geometry::{Rect, SizeBox};
use serde::{Deserialize, Serialize};

use crate::collapser::Collapser;
use crate::frame::Frame;
use crate::splitter::Splitter;
use crate::tree::DockTree;

/// Stable identifier for container nodes (frames, splitters, collapsers).
///
/// `0` is reserved so ids are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node id.
    pub const MIN: Self = Self(1);

    /// Wrap a raw value, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Stable identifier for panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(u64);

impl PanelId {
    pub const MIN: Self = Self(1);

    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// Orientation of a splitter.
///
/// `Horizontal` lays children out left-to-right (the divider is vertical),
/// `Vertical` lays them out top-to-bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Extent of a size along this orientation's primary axis.
    #[inline]
    #[must_use]
    pub fn primary(self, size: SizeBox) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of a size along the cross axis.
    #[inline]
    #[must_use]
    pub fn cross(self, size: SizeBox) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Build a size box from primary and cross extents.
    #[inline]
    #[must_use]
    pub fn compose(self, primary: f64, cross: f64) -> SizeBox {
        match self {
            Self::Horizontal => SizeBox::new(primary, cross),
            Self::Vertical => SizeBox::new(cross, primary),
        }
    }

    /// Primary extent of a rectangle.
    #[inline]
    #[must_use]
    pub fn extent(self, rect: Rect) -> f64 {
        self.primary(rect.size())
    }
}

/// Where a frame draws its tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabOrientation {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl TabOrientation {
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Axis the title bar consumes space on.
    #[must_use]
    pub const fn consumed_axis(self) -> Orientation {
        match self {
            Self::Top | Self::Bottom => Orientation::Vertical,
            Self::Left | Self::Right => Orientation::Horizontal,
        }
    }

    /// Band of `rect` occupied by a title bar of the given thickness.
    #[must_use]
    pub fn band(self, rect: Rect, thickness: f64) -> Rect {
        let t = thickness.max(0.0);
        match self {
            Self::Top => Rect::new(rect.x, rect.y, rect.width, t.min(rect.height)),
            Self::Bottom => {
                let h = t.min(rect.height);
                Rect::new(rect.x, rect.bottom() - h, rect.width, h)
            }
            Self::Left => Rect::new(rect.x, rect.y, t.min(rect.width), rect.height),
            Self::Right => {
                let w = t.min(rect.width);
                Rect::new(rect.right() - w, rect.y, w, rect.height)
            }
        }
    }

    /// Remaining content area of `rect` once the title band is removed.
    #[must_use]
    pub fn content(self, rect: Rect, thickness: f64) -> Rect {
        let t = thickness.max(0.0);
        match self {
            Self::Top => {
                let h = t.min(rect.height);
                Rect::new(rect.x, rect.y + h, rect.width, rect.height - h)
            }
            Self::Bottom => Rect::new(rect.x, rect.y, rect.width, (rect.height - t).max(0.0)),
            Self::Left => {
                let w = t.min(rect.width);
                Rect::new(rect.x + w, rect.y, rect.width - w, rect.height)
            }
            Self::Right => Rect::new(rect.x, rect.y, (rect.width - t).max(0.0), rect.height),
        }
    }
}

/// Edge a collapser drawer is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockEdge {
    Left,
    Right,
    Bottom,
}

impl DockEdge {
    /// Drawer edges in nesting order, outermost first.
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::Bottom];

    /// Orientation of the drawer splitter wrapping this edge.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Bottom => Orientation::Vertical,
        }
    }

    /// Whether the collapser sits in the first slot of its drawer splitter.
    #[must_use]
    pub const fn collapser_first(self) -> bool {
        matches!(self, Self::Left)
    }

    /// Nesting rank: lower ranks wrap higher ranks.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Bottom => 2,
        }
    }
}

/// Dock location of an insertion or anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockLocation {
    Left,
    Right,
    Top,
    Bottom,
    Stacked,
    Float,
    Modal,
}

impl DockLocation {
    /// Splitter orientation for split locations, `None` otherwise.
    #[must_use]
    pub const fn split_orientation(self) -> Option<Orientation> {
        match self {
            Self::Left | Self::Right => Some(Orientation::Horizontal),
            Self::Top | Self::Bottom => Some(Orientation::Vertical),
            Self::Stacked | Self::Float | Self::Modal => None,
        }
    }

    /// For split locations: whether the incoming node takes the first slot.
    #[must_use]
    pub const fn incoming_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// Reference to something a panel can be docked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockTarget {
    /// The frame currently holding this panel.
    Panel(PanelId),
    /// A specific container node.
    Node(NodeId),
}

impl From<PanelId> for DockTarget {
    fn from(panel: PanelId) -> Self {
        Self::Panel(panel)
    }
}

impl From<NodeId> for DockTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for DockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel(panel) => write!(f, "{panel}"),
            Self::Node(node) => write!(f, "{node}"),
        }
    }
}

/// Capability contract shared by every container kind.
pub trait NodeBehavior {
    /// Smallest size the node can be laid out at.
    fn min_size(&self, tree: &DockTree) -> SizeBox;

    /// Largest useful size (infinite axes are unbounded).
    fn max_size(&self, tree: &DockTree) -> SizeBox;

    /// Child nodes owned by this node, in slot order.
    fn child_nodes(&self) -> Vec<NodeId>;
}

/// Container payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Frame(Frame),
    Splitter(Splitter),
    Collapser(Collapser),
}

impl NodeKind {
    fn behavior(&self) -> &dyn NodeBehavior {
        match self {
            Self::Frame(frame) => frame,
            Self::Splitter(splitter) => splitter,
            Self::Collapser(collapser) => collapser,
        }
    }

    #[must_use]
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_splitter(&self) -> Option<&Splitter> {
        match self {
            Self::Splitter(splitter) => Some(splitter),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collapser(&self) -> Option<&Collapser> {
        match self {
            Self::Collapser(collapser) => Some(collapser),
            _ => None,
        }
    }

    pub(crate) fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub(crate) fn as_splitter_mut(&mut self) -> Option<&mut Splitter> {
        match self {
            Self::Splitter(splitter) => Some(splitter),
            _ => None,
        }
    }

    pub(crate) fn as_collapser_mut(&mut self) -> Option<&mut Collapser> {
        match self {
            Self::Collapser(collapser) => Some(collapser),
            _ => None,
        }
    }
}

/// One arena entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    /// Last solved rectangle (authoritative position for floating frames).
    pub(crate) rect: Rect,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            id,
            parent,
            rect: Rect::default(),
            kind,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

impl NodeBehavior for Node {
    fn min_size(&self, tree: &DockTree) -> SizeBox {
        self.kind.behavior().min_size(tree)
    }

    fn max_size(&self, tree: &DockTree) -> SizeBox {
        self.kind.behavior().max_size(tree)
    }

    fn child_nodes(&self) -> Vec<NodeId> {
        self.kind.behavior().child_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ids_are_rejected() {
        assert!(NodeId::new(0).is_none());
        assert!(PanelId::new(0).is_none());
        assert_eq!(NodeId::new(7).map(NodeId::get), Some(7));
    }

    #[test]
    fn title_band_and_content_partition_rect() {
        let rect = Rect::new(10.0, 20.0, 200.0, 100.0);
        for orientation in TabOrientation::ALL {
            let band = orientation.band(rect, 24.0);
            let content = orientation.content(rect, 24.0);
            let area = band.width * band.height + content.width * content.height;
            assert!((area - rect.width * rect.height).abs() < 1e-9, "{orientation:?}");
            assert!(band.intersection_opt(&content).is_none(), "{orientation:?}");
        }
    }

    #[test]
    fn split_locations_map_to_orientation_and_order() {
        assert_eq!(
            DockLocation::Left.split_orientation(),
            Some(Orientation::Horizontal)
        );
        assert_eq!(
            DockLocation::Bottom.split_orientation(),
            Some(Orientation::Vertical)
        );
        assert_eq!(DockLocation::Stacked.split_orientation(), None);
        assert!(DockLocation::Top.incoming_first());
        assert!(!DockLocation::Right.incoming_first());
    }

    #[test]
    fn orientation_compose_inverts_projection() {
        let size = Orientation::Vertical.compose(30.0, 40.0);
        assert_eq!(size, SizeBox::new(40.0, 30.0));
        assert_eq!(Orientation::Vertical.primary(size), 30.0);
        assert_eq!(Orientation::Vertical.cross(size), 40.0);
    }
}
