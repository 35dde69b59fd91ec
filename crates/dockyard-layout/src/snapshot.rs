//! Layout snapshots.
//!
//! A snapshot is a self-contained description of the docked tree, the
//! floating frames and the edge drawers. Node and panel ids are not part of
//! it: restoring allocates fresh ids and instantiates every panel through the
//! registry before overwriting it with the recorded fields.
//!
//! Drawer splitters are implied by the collapser records and never written;
//! the placeholder panel is recreated by the tree and never written either.

use dockyard_core::geometry::{Point, Rect, SizeBox};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DockError, Result};
use crate::frame::Frame;
use crate::node::{DockEdge, NodeId, NodeKind, Orientation, PanelId, TabOrientation};
use crate::panel::PanelFlags;
use crate::registry::PanelRegistry;
use crate::splitter::{Slot, Splitter};
use crate::tree::DockTree;

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    SNAPSHOT_SCHEMA_VERSION
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Main region, without the drawers around it.
    #[serde(default)]
    pub root: Option<NodeRecord>,
    /// Floating and modal frames, bottom to top.
    #[serde(default)]
    pub floating: Vec<FloatingRecord>,
    #[serde(default)]
    pub collapsers: Vec<CollapserRecord>,
}

impl Default for LayoutSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            root: None,
            floating: Vec::new(),
            collapsers: Vec::new(),
        }
    }
}

impl LayoutSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of panel records in the snapshot.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.root.as_ref().map_or(0, NodeRecord::panel_count)
            + self
                .floating
                .iter()
                .map(|f| f.frame.panels.len())
                .sum::<usize>()
            + self
                .collapsers
                .iter()
                .map(|c| c.frame.panels.len())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeRecord {
    Splitter {
        orientation: Orientation,
        position: f64,
        first: Box<NodeRecord>,
        second: Box<NodeRecord>,
    },
    Frame(FrameRecord),
}

impl NodeRecord {
    fn panel_count(&self) -> usize {
        match self {
            Self::Splitter { first, second, .. } => first.panel_count() + second.panel_count(),
            Self::Frame(frame) => frame.panels.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub tab_orientation: TabOrientation,
    #[serde(default)]
    pub active: Option<usize>,
    #[serde(default = "default_true")]
    pub show_title: bool,
    pub panels: Vec<PanelRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRecord {
    pub panel_type: String,
    #[serde(default)]
    pub title: String,
    pub desired_size: SizeBox,
    #[serde(default)]
    pub min_size: SizeBox,
    #[serde(default = "unbounded")]
    pub max_size: SizeBox,
    /// [`PanelFlags`] bits.
    pub flags: u8,
    #[serde(default)]
    pub scroll: Point,
    #[serde(default)]
    pub payload: Value,
}

fn unbounded() -> SizeBox {
    SizeBox::UNBOUNDED
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingRecord {
    pub rect: Rect,
    #[serde(default)]
    pub modal: bool,
    pub frame: FrameRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapserRecord {
    pub edge: DockEdge,
    pub expanded: bool,
    #[serde(default)]
    pub open_size: Option<f64>,
    /// Drawer divider fraction; applied only when expanded.
    #[serde(default)]
    pub position: Option<f64>,
    pub frame: FrameRecord,
}

/// Outcome of a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub panels: usize,
    /// Panel types that were not registered and were skipped.
    pub skipped: Vec<String>,
}

impl DockTree {
    /// Capture the current layout.
    #[must_use]
    pub fn save(&self) -> LayoutSnapshot {
        let root = self.main_root().and_then(|main| self.record_node(main));
        let floating = self
            .floating()
            .iter()
            .chain(self.modal().iter())
            .filter_map(|id| {
                let node = self.node(*id)?;
                let frame = node.kind().as_frame()?;
                Some(FloatingRecord {
                    rect: node.rect(),
                    modal: frame.is_modal(),
                    frame: self.record_frame(frame),
                })
            })
            .collect();
        let collapsers = DockEdge::ALL
            .into_iter()
            .filter_map(|edge| {
                let collapser = self.collapser(edge).and_then(|id| self.collapser_node(id))?;
                let frame = self.frame(collapser.frame())?;
                let mut record = self.record_frame(frame);
                if !collapser.is_expanded() {
                    record.active = collapser.last_active.and_then(|p| frame.position_of(p));
                }
                Some(CollapserRecord {
                    edge,
                    expanded: collapser.is_expanded(),
                    open_size: collapser.open_size(),
                    position: self.drawer_position(edge),
                    frame: record,
                })
            })
            .collect();
        LayoutSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            root,
            floating,
            collapsers,
        }
    }

    fn record_node(&self, id: NodeId) -> Option<NodeRecord> {
        match self.node(id)?.kind() {
            NodeKind::Splitter(splitter) => {
                let first = splitter.first().and_then(|c| self.record_node(c));
                let second = splitter.second().and_then(|c| self.record_node(c));
                match (first, second) {
                    (Some(first), Some(second)) => Some(NodeRecord::Splitter {
                        orientation: splitter.orientation(),
                        position: splitter.position(),
                        first: Box::new(first),
                        second: Box::new(second),
                    }),
                    (Some(only), None) | (None, Some(only)) => Some(only),
                    (None, None) => None,
                }
            }
            NodeKind::Frame(frame) => {
                let record = self.record_frame(frame);
                (!record.panels.is_empty()).then_some(NodeRecord::Frame(record))
            }
            NodeKind::Collapser(_) => None,
        }
    }

    fn record_frame(&self, frame: &Frame) -> FrameRecord {
        let mut active = None;
        let mut panels = Vec::with_capacity(frame.panels().len());
        for (index, id) in frame.panels().iter().enumerate() {
            let Some(panel) = self.panel(*id).filter(|p| !p.is_placeholder()) else {
                continue;
            };
            if frame.active() == Some(index) {
                active = Some(panels.len());
            }
            panels.push(PanelRecord {
                panel_type: panel.panel_type().to_owned(),
                title: panel.title.clone(),
                desired_size: panel.desired_size,
                min_size: panel.min_size(),
                max_size: panel.max_size(),
                flags: panel.flags.bits(),
                scroll: panel.scroll,
                payload: panel.payload.clone(),
            });
        }
        FrameRecord {
            tab_orientation: frame.tab_orientation(),
            active,
            show_title: frame.shows_title(),
            panels,
        }
    }

    /// Replace the layout with `snapshot`.
    ///
    /// Retained persistent panels survive; everything else is rebuilt with
    /// fresh ids. Records of unregistered panel types are skipped with a
    /// warning. Fails without touching the tree on an unsupported schema.
    pub fn restore(
        &mut self,
        snapshot: &LayoutSnapshot,
        registry: &PanelRegistry,
    ) -> Result<RestoreReport> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(DockError::UnsupportedSchema(snapshot.schema_version));
        }
        self.transact("restore", |tree| {
            let mut report = RestoreReport::default();
            tree.clear_layout();

            let root = match &snapshot.root {
                Some(record) => tree.build_node(record, registry, &mut report)?,
                None => None,
            };
            tree.set_root(root);

            for record in &snapshot.floating {
                let panels = tree.build_panels(&record.frame.panels, registry, &mut report)?;
                if panels.is_empty() {
                    continue;
                }
                let frame = tree.build_frame(Frame::floating(record.modal), &record.frame, &panels)?;
                tree.push_floating(frame, record.rect);
            }

            let mut collapsers: Vec<&CollapserRecord> = snapshot.collapsers.iter().collect();
            collapsers.sort_by_key(|c| c.edge.rank());
            for record in collapsers {
                let panels = tree.build_panels(&record.frame.panels, registry, &mut report)?;
                let collapser = tree.ensure_collapser(record.edge);
                let frame = tree
                    .collapser_node(collapser)
                    .map(|c| c.frame())
                    .ok_or(DockError::MissingCollapser(record.edge))?;
                for panel in &panels {
                    tree.attach_restored(frame, *panel)?;
                }
                let f = tree.frame_mut(frame)?;
                f.show_title = record.frame.show_title;
                f.tab_orientation = record.frame.tab_orientation;
                let active = record.frame.active.filter(|i| *i < panels.len());
                tree.restore_collapser_state(
                    record.edge,
                    record.expanded,
                    record.open_size,
                    active,
                    record.position,
                )?;
            }

            debug!(
                target: "dockyard.snapshot",
                panels = report.panels,
                skipped = report.skipped.len(),
                "layout restored"
            );
            Ok(report)
        })
    }

    fn build_node(
        &mut self,
        record: &NodeRecord,
        registry: &PanelRegistry,
        report: &mut RestoreReport,
    ) -> Result<Option<NodeId>> {
        match record {
            NodeRecord::Splitter {
                orientation,
                position,
                first,
                second,
            } => {
                let first = self.build_node(first, registry, report)?;
                let second = self.build_node(second, registry, report)?;
                Ok(match (first, second) {
                    (Some(first), Some(second)) => {
                        let mut splitter = Splitter::new(*orientation, *position);
                        splitter.set_child(Slot::First, Some(first));
                        splitter.set_child(Slot::Second, Some(second));
                        Some(self.new_splitter_node(splitter))
                    }
                    (only, None) | (None, only) => only,
                })
            }
            NodeRecord::Frame(frame) => {
                let panels = self.build_panels(&frame.panels, registry, report)?;
                if panels.is_empty() {
                    return Ok(None);
                }
                self.build_frame(Frame::new(), frame, &panels).map(Some)
            }
        }
    }

    fn build_frame(&mut self, mut frame: Frame, record: &FrameRecord, panels: &[PanelId]) -> Result<NodeId> {
        frame.tab_orientation = record.tab_orientation;
        frame.show_title = record.show_title;
        let id = self.new_frame_node(frame);
        for panel in panels {
            self.attach_restored(id, *panel)?;
        }
        if let Some(active) = record.active.filter(|i| *i < panels.len()) {
            self.frame_mut(id)?.active = Some(active);
        }
        Ok(id)
    }

    fn build_panels(
        &mut self,
        records: &[PanelRecord],
        registry: &PanelRegistry,
        report: &mut RestoreReport,
    ) -> Result<Vec<PanelId>> {
        let mut panels = Vec::with_capacity(records.len());
        for record in records {
            let (init, options) = match registry.instantiate(&record.panel_type) {
                Ok(found) => found,
                Err(DockError::UnknownPanelType(name)) => {
                    warn!(target: "dockyard.snapshot", panel_type = %name, "skipping unregistered panel type");
                    report.skipped.push(name);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let id = self.create_panel_with(&record.panel_type, init, options.persistent)?;
            if let Some(panel) = self.panel_mut(id) {
                panel.title.clone_from(&record.title);
                panel.desired_size = record.desired_size;
                panel.set_size_limits(record.min_size, record.max_size);
                panel.flags = PanelFlags::from_bits_truncate(record.flags);
                panel.scroll = record.scroll;
                panel.payload = record.payload.clone();
            }
            report.panels += 1;
            panels.push(id);
        }
        Ok(panels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DockLocation, DockTarget};
    use crate::panel::PanelInit;
    use crate::registry::PanelTypeOptions;
    use crate::tree::InsertOptions;

    fn registry() -> PanelRegistry {
        let mut registry = PanelRegistry::new();
        for name in ["editor", "console", "files"] {
            registry
                .register(name, PanelTypeOptions::default(), |_| {})
                .expect("register");
        }
        registry
    }

    fn sample_tree() -> DockTree {
        let mut tree = DockTree::default();
        let editor = tree.create_panel("editor", PanelInit::titled("main.rs")).expect("editor");
        tree.insert_alone(editor, DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        let console = tree.create_panel("console", PanelInit::titled("Console")).expect("console");
        tree.insert_alone(
            console,
            DockLocation::Bottom,
            Some(DockTarget::Panel(editor)),
            InsertOptions {
                fraction: Some(0.7),
                ..InsertOptions::default()
            },
        )
        .expect("console");
        let files = tree
            .create_panel("files", PanelInit::titled("Files").with_max(300.0, f64::INFINITY))
            .expect("files");
        tree.collapse_panel(files, DockEdge::Left).expect("collapse");
        tree
    }

    #[test]
    fn save_skips_drawers_and_ids() {
        let snapshot = sample_tree().save();
        let Some(NodeRecord::Splitter {
            orientation,
            position,
            ..
        }) = &snapshot.root
        else {
            panic!("expected splitter root, got {:?}", snapshot.root);
        };
        assert_eq!(*orientation, Orientation::Vertical);
        assert_eq!(*position, 0.7);
        assert_eq!(snapshot.collapsers.len(), 1);
        assert_eq!(snapshot.collapsers[0].edge, DockEdge::Left);
        assert!(!snapshot.collapsers[0].expanded);
        assert_eq!(snapshot.panel_count(), 3);
    }

    #[test]
    fn restore_then_save_is_stable() {
        let snapshot = sample_tree().save();
        let mut restored = DockTree::default();
        let report = restored.restore(&snapshot, &registry()).expect("restore");
        assert_eq!(report.panels, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(restored.save(), snapshot);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn collapsed_drawer_forgets_a_removed_active_tab() {
        let mut tree = sample_tree();
        let console = tree.create_panel("console", PanelInit::titled("Log")).expect("log");
        tree.collapse_panel(console, DockEdge::Left).expect("collapse");
        tree.expand(DockEdge::Left, Some(1)).expect("expand");
        tree.collapse(DockEdge::Left).expect("collapse");
        assert_eq!(tree.save().collapsers[0].frame.active, Some(1));

        tree.remove(console).expect("remove");
        let snapshot = tree.save();
        let drawer = &snapshot.collapsers[0].frame;
        assert_eq!(drawer.panels.len(), 1);
        assert!(drawer.active.is_none_or(|i| i < drawer.panels.len()));

        let mut restored = DockTree::default();
        restored.restore(&snapshot, &registry()).expect("restore");
        assert_eq!(restored.save(), snapshot);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn collapsed_drawer_keeps_its_tab_across_reorders() {
        let mut tree = sample_tree();
        let log = tree.create_panel("console", PanelInit::titled("Log")).expect("log");
        let frame = tree.collapse_panel(log, DockEdge::Left).expect("collapse");
        tree.expand(DockEdge::Left, Some(1)).expect("expand");
        tree.collapse(DockEdge::Left).expect("collapse");
        tree.move_tab(frame, 1, 0).expect("reorder");
        assert_eq!(tree.save().collapsers[0].frame.active, Some(0));

        tree.expand(DockEdge::Left, None).expect("expand");
        assert_eq!(tree.frame(frame).and_then(|f| f.active_panel()), Some(log));
    }

    #[test]
    fn infinite_sizes_use_sentinel() {
        let json = sample_tree().save().to_json().expect("json");
        assert!(json.contains("\"Infinity\""));
        let back = LayoutSnapshot::from_json(&json).expect("parse");
        assert_eq!(back, sample_tree().save());
    }

    #[test]
    fn unknown_types_are_skipped() {
        let snapshot = sample_tree().save();
        let mut registry = PanelRegistry::new();
        registry
            .register("editor", PanelTypeOptions::default(), |_| {})
            .expect("register");
        let mut tree = DockTree::default();
        let report = tree.restore(&snapshot, &registry).expect("restore");
        assert_eq!(report.panels, 1);
        assert_eq!(report.skipped, vec!["console".to_owned(), "files".to_owned()]);
        assert!(matches!(tree.save().root, Some(NodeRecord::Frame(_))));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn unsupported_schema_leaves_tree_alone() {
        let mut tree = sample_tree();
        let before = tree.save();
        let snapshot = LayoutSnapshot {
            schema_version: 99,
            ..LayoutSnapshot::default()
        };
        assert!(matches!(
            tree.restore(&snapshot, &registry()),
            Err(DockError::UnsupportedSchema(99))
        ));
        assert_eq!(tree.save(), before);
    }

    #[test]
    fn empty_snapshot_restores_placeholder() {
        let mut tree = sample_tree();
        tree.restore(&LayoutSnapshot::default(), &registry()).expect("restore");
        assert!(tree.placeholder().is_some());
        assert_eq!(tree.save().root, None);
    }
}
