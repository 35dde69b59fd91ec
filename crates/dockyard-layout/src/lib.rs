#![forbid(unsafe_code)]

//! Docking layout engine.
//!
//! # Role in Dockyard
//! `dockyard-layout` owns the layout model: panels hosted in tabbed frames,
//! frames arranged by two-way splitters, edge drawers built from collapsers,
//! and floating/modal frames above the docked tree. It solves sizes against
//! every panel's limits, resolves drag targets from pointer positions, and
//! saves and restores the whole arrangement as JSON.
//!
//! # How it fits in the system
//! Hosts usually talk to [`DockManager`] only: register panel types, feed
//! [`dockyard_core::event::InputEvent`]s, call [`DockManager::tick`] and drain
//! [`LayoutEvent`]s to paint. [`DockTree`] is public for hosts that want to
//! drive structural mutations directly.

pub mod anchor;
pub mod collapser;
pub mod config;
pub mod drag;
pub mod engine;
pub mod error;
pub mod event;
pub mod frame;
pub mod layout;
pub mod node;
pub mod panel;
pub mod registry;
pub mod snapshot;
pub mod splitter;
pub mod tree;

pub use anchor::{Anchor, AnchorDetector, AnchorQuery, FrameCandidate};
pub use config::{AnchorBand, DockConfig};
pub use dockyard_core::geometry::{Point, Rect, Sides, SizeBox};
pub use engine::{DockManager, Hit};
pub use error::{ConfigError, DockError, InvariantViolation, Result};
pub use event::LayoutEvent;
pub use node::{DockEdge, DockLocation, DockTarget, NodeId, Orientation, PanelId, TabOrientation};
pub use panel::{PanelFlags, PanelInit};
pub use registry::{PanelRegistry, PanelTypeOptions};
pub use snapshot::{LayoutSnapshot, RestoreReport, SNAPSHOT_SCHEMA_VERSION};
pub use tree::{DockTree, InsertOptions};
