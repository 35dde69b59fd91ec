//! Error types for layout operations.
//!
//! Nothing in the engine is fatal: every failure is a `Result::Err` returned
//! from a mutation, registration, drag, or restore call, and the tree is left
//! exactly as it was before the call.

use thiserror::Error;

use crate::node::{DockEdge, DockLocation, NodeId, PanelId};

pub type Result<T> = std::result::Result<T, DockError>;

/// Failure of a public engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    #[error("panel {0} not found")]
    UnknownPanel(PanelId),

    #[error("node {0} not found")]
    UnknownNode(NodeId),

    #[error("node {0} is not a frame")]
    NotAFrame(NodeId),

    #[error("node {0} is not a splitter")]
    NotASplitter(NodeId),

    #[error("panel {0} is already docked")]
    PanelAttached(PanelId),

    #[error("panel {0} is not docked")]
    PanelDetached(PanelId),

    #[error("cannot dock {location:?} against {target}: {reason}")]
    InvalidTarget {
        location: DockLocation,
        target: String,
        reason: &'static str,
    },

    #[error("the placeholder panel cannot be {0}")]
    PlaceholderLocked(&'static str),

    #[error("panel {panel} does not allow being {action}")]
    NotPermitted {
        panel: PanelId,
        action: &'static str,
    },

    #[error("panel type `{0}` is already registered")]
    DuplicatePanelType(String),

    #[error("panel type `{0}` is reserved")]
    ReservedPanelType(String),

    #[error("panel type `{0}` is not registered")]
    UnknownPanelType(String),

    #[error("panel type `{name}` reached its instance limit of {limit}")]
    PanelLimitReached { name: String, limit: usize },

    #[error("a collapser already exists on the {0:?} edge")]
    DuplicateCollapser(DockEdge),

    #[error("no collapser on the {0:?} edge")]
    MissingCollapser(DockEdge),

    #[error("tab index {index} out of range for frame {frame} with {len} tabs")]
    TabOutOfRange {
        frame: NodeId,
        index: usize,
        len: usize,
    },

    #[error("another drag is already in progress")]
    DragInProgress,

    #[error("no drag is in progress")]
    NoActiveDrag,

    #[error("unsupported snapshot schema version {0}")]
    UnsupportedSchema(u16),

    #[error("snapshot encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for DockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f64 },

    #[error("`{field}` percentage must lie in (0, 0.5], got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    #[error("`response_rate_ms` must be at least 1")]
    ZeroResponseRate,

    #[error("invalid configuration json: {0}")]
    Json(String),

    #[error("failed to read configuration: {0}")]
    Io(String),
}

/// One violated structural invariant, reported by [`crate::DockTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("node {node} references missing child {child}")]
    MissingChild { node: NodeId, child: NodeId },

    #[error("node {node} records parent {recorded:?} but is held by {actual:?}")]
    ParentMismatch {
        node: NodeId,
        recorded: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("splitter {0} has an empty slot")]
    HollowSplitter(NodeId),

    #[error("frame {0} has no panels")]
    EmptyFrame(NodeId),

    #[error("frame {frame} has active tab {active:?} with {len} panels")]
    ActiveTabOutOfRange {
        frame: NodeId,
        active: Option<usize>,
        len: usize,
    },

    #[error("panel {panel} claims frame {claimed:?} but is listed in {actual:?}")]
    PanelOwnerMismatch {
        panel: PanelId,
        claimed: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("panel {0} is listed by more than one frame")]
    PanelListedTwice(PanelId),

    #[error("collapser {0} is not held by a drawer splitter")]
    LooseCollapser(NodeId),

    #[error("node {0} is unreachable")]
    Unreachable(NodeId),

    #[error("node {0} is reachable more than once")]
    Shared(NodeId),

    #[error("the main region is empty")]
    EmptyMainRegion,

    #[error("placeholder presence is {present} but should be {expected}")]
    PlaceholderMismatch { present: bool, expected: bool },

    #[error("placeholder shares frame {0} with other panels")]
    PlaceholderShared(NodeId),
}
