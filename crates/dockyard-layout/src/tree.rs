//! The dock tree arena and its structural mutations.
//!
//! # Shape
//!
//! ```text
//! root ─ drawer(Left) ─┬─ collapser(Left) ─ frame
//!                      └─ drawer(Right) ─┬─ drawer(Bottom) ─┬─ main region
//!                                        │                  └─ collapser(Bottom)
//!                                        └─ collapser(Right)
//! floating: [frame, frame, ...]   (bottom to top)
//! modal:    [frame, ...]          (above every floating frame)
//! ```
//!
//! Drawer splitters only exist for edges that have a collapser, and always
//! nest in the order left, right, bottom. Whatever sits inside the innermost
//! drawer splitter is the main region.
//!
//! # Mutation model
//!
//! Every public mutation runs against a clone of the tree. On success a
//! rebalance sweep (drop empty frames, simplify splitters, reclaim orphaned
//! collapsers, maintain the placeholder) runs on the clone before it replaces
//! `self`; on failure the clone is dropped and the tree is untouched.

use std::collections::BTreeMap;

use dockyard_core::geometry::{Rect, SizeBox};
use tracing::{debug, warn};

use crate::collapser::Collapser;
use crate::config::DockConfig;
use crate::error::{DockError, InvariantViolation, Result};
use crate::event::LayoutEvent;
use crate::frame::Frame;
use crate::node::{
    DockEdge, DockLocation, DockTarget, Node, NodeBehavior, NodeId, NodeKind, Orientation,
    PanelId, TabOrientation,
};
use crate::panel::{PLACEHOLDER_TYPE, Panel, PanelFlags, PanelInit};
use crate::splitter::{SideBounds, Slot, Splitter, best_position};

/// Tuning for a single insertion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InsertOptions {
    /// Explicit divider fraction for a split.
    pub fraction: Option<f64>,
    /// Requested pixel extent of the incoming side of a split.
    pub size: Option<f64>,
    /// Tab slot for stacked insertions.
    pub tab_index: Option<usize>,
    /// Rectangle for floating insertions.
    pub rect: Option<Rect>,
    /// Make the inserted panel the active tab.
    pub activate: bool,
}

/// Where a node is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Holder {
    Root,
    Slot(NodeId, Slot),
    Floating,
    Modal,
    Drawer(NodeId),
}

#[derive(Debug, Clone)]
pub struct DockTree {
    config: DockConfig,
    area: Rect,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) panels: BTreeMap<PanelId, Panel>,
    root: Option<NodeId>,
    floating: Vec<NodeId>,
    modal: Vec<NodeId>,
    collapsers: BTreeMap<DockEdge, NodeId>,
    placeholder: Option<PanelId>,
    next_node: NodeId,
    next_panel: PanelId,
    /// Divider bar rectangles from the last solve.
    pub(crate) bars: BTreeMap<NodeId, Rect>,
    events: Vec<LayoutEvent>,
}

impl Default for DockTree {
    fn default() -> Self {
        Self::new(DockConfig::default())
    }
}

impl DockTree {
    /// Empty layout: a main region holding only the placeholder panel.
    #[must_use]
    pub fn new(config: DockConfig) -> Self {
        let mut tree = Self {
            config,
            area: Rect::default(),
            nodes: BTreeMap::new(),
            panels: BTreeMap::new(),
            root: None,
            floating: Vec::new(),
            modal: Vec::new(),
            collapsers: BTreeMap::new(),
            placeholder: None,
            next_node: NodeId::MIN,
            next_panel: PanelId::MIN,
            bars: BTreeMap::new(),
            events: Vec::new(),
        };
        tree.rebalance();
        tree
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: DockConfig) {
        self.config = config;
    }

    /// Layout area the tree is solved into.
    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Floating frames, bottom to top.
    #[must_use]
    pub fn floating(&self) -> &[NodeId] {
        &self.floating
    }

    /// Modal frames, bottom to top.
    #[must_use]
    pub fn modal(&self) -> &[NodeId] {
        &self.modal
    }

    #[must_use]
    pub fn collapser(&self, edge: DockEdge) -> Option<NodeId> {
        self.collapsers.get(&edge).copied()
    }

    #[must_use]
    pub const fn placeholder(&self) -> Option<PanelId> {
        self.placeholder
    }

    #[must_use]
    pub fn frame(&self, id: NodeId) -> Option<&Frame> {
        self.nodes.get(&id).and_then(|node| node.kind.as_frame())
    }

    #[must_use]
    pub fn splitter(&self, id: NodeId) -> Option<&Splitter> {
        self.nodes.get(&id).and_then(|node| node.kind.as_splitter())
    }

    #[must_use]
    pub fn collapser_node(&self, id: NodeId) -> Option<&Collapser> {
        self.nodes.get(&id).and_then(|node| node.kind.as_collapser())
    }

    /// Frame currently holding a panel.
    #[must_use]
    pub fn frame_of(&self, panel: PanelId) -> Option<NodeId> {
        self.panels.get(&panel).and_then(|p| p.frame)
    }

    /// Root of the main region (inside every drawer splitter).
    #[must_use]
    pub fn main_root(&self) -> Option<NodeId> {
        self.holder_child(self.main_holder())
    }

    /// Divider bar of a splitter from the last solve.
    #[must_use]
    pub fn splitter_bar(&self, id: NodeId) -> Option<Rect> {
        self.bars.get(&id).copied()
    }

    /// Pending notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<LayoutEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: LayoutEvent) {
        self.events.push(event);
    }

    /// Pre-order node ids of a subtree.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            let mut children = node.child_nodes();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Every frame in paint order: docked tree, floating, then modal.
    #[must_use]
    pub fn frames(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self.root.into_iter().collect();
        roots.extend(self.floating.iter().copied());
        roots.extend(self.modal.iter().copied());
        roots
            .into_iter()
            .flat_map(|root| self.subtree(root))
            .filter(|id| self.frame(*id).is_some())
            .collect()
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    /// Frame that lives inside a collapser.
    #[must_use]
    pub fn is_drawer_frame(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .and_then(|node| node.parent)
            .is_some_and(|parent| self.collapser_node(parent).is_some())
    }

    /// Drawer frame whose collapser is collapsed.
    #[must_use]
    pub fn is_collapsed_frame(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .and_then(|node| node.parent)
            .and_then(|parent| self.collapser_node(parent))
            .is_some_and(|collapser| !collapser.expanded)
    }

    /// Frame holding exactly the placeholder panel.
    #[must_use]
    pub fn is_placeholder_frame(&self, id: NodeId) -> bool {
        self.frame(id).is_some_and(|frame| {
            frame.panels.len() == 1 && Some(frame.panels[0]) == self.placeholder
        })
    }

    /// A detached persistent panel of `panel_type` kept for reuse.
    #[must_use]
    pub fn retained_panel(&self, panel_type: &str) -> Option<PanelId> {
        self.panels
            .values()
            .find(|p| p.frame.is_none() && p.persistent && p.panel_type == panel_type)
            .map(|p| p.id)
    }

    /// Live instances of a panel type, attached or retained.
    #[must_use]
    pub fn count_of_type(&self, panel_type: &str) -> usize {
        self.panels
            .values()
            .filter(|p| p.panel_type == panel_type)
            .count()
    }

    /// Title band of a frame from the last solve.
    #[must_use]
    pub fn title_band(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        let frame = node.kind.as_frame()?;
        if !frame.show_title {
            return None;
        }
        Some(
            frame
                .tab_orientation
                .band(node.rect, self.config.title_bar_size),
        )
    }

    // ---------------------------------------------------------------------
    // Panels
    // ---------------------------------------------------------------------

    /// Create a detached panel.
    pub fn create_panel(&mut self, panel_type: &str, init: PanelInit) -> Result<PanelId> {
        self.create_panel_with(panel_type, init, false)
    }

    pub(crate) fn create_panel_with(
        &mut self,
        panel_type: &str,
        init: PanelInit,
        persistent: bool,
    ) -> Result<PanelId> {
        if panel_type == PLACEHOLDER_TYPE || panel_type.is_empty() {
            return Err(DockError::ReservedPanelType(panel_type.to_owned()));
        }
        let id = self.alloc_panel();
        self.panels
            .insert(id, Panel::from_init(id, panel_type, init, persistent));
        debug!(target: "dockyard.tree", %id, panel_type, "panel created");
        self.emit(LayoutEvent::PanelCreated(id));
        Ok(id)
    }

    /// Destroy a detached panel (typically a retained persistent one).
    pub fn discard_panel(&mut self, panel: PanelId) -> Result<()> {
        let p = self.panel_ref(panel)?;
        if p.frame.is_some() {
            return Err(DockError::PanelAttached(panel));
        }
        self.panels.remove(&panel);
        self.emit(LayoutEvent::PanelDestroyed(panel));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Public mutations
    // ---------------------------------------------------------------------

    /// Dock a detached panel in a new frame of its own.
    ///
    /// Split locations wrap `target` (or the main region) in a new splitter;
    /// a placeholder frame target is reused instead. `Stacked` delegates to
    /// [`Self::insert_grouped`]; `Float` and `Modal` create a floating frame.
    /// Returns the frame that received the panel.
    pub fn insert_alone(
        &mut self,
        panel: PanelId,
        location: DockLocation,
        target: Option<DockTarget>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        self.transact("insert_alone", |tree| {
            tree.check_insertable(panel)?;
            let target = tree.resolve_target(target)?;
            tree.insert_alone_in(panel, location, target, options)
        })
    }

    /// Dock a detached panel as a tab of the target's frame, falling back to
    /// a split on the right when the target has no frame.
    pub fn insert_grouped(
        &mut self,
        panel: PanelId,
        target: Option<DockTarget>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        self.transact("insert_grouped", |tree| {
            tree.check_insertable(panel)?;
            let target = tree.resolve_target(target)?;
            tree.insert_grouped_in(panel, target, options)
        })
    }

    /// Take a panel out of the layout. Persistent panels are retained
    /// detached; everything else is destroyed.
    pub fn remove(&mut self, panel: PanelId) -> Result<()> {
        self.transact("remove", |tree| {
            let p = tree.panel_ref(panel)?;
            if p.is_placeholder() {
                return Err(DockError::PlaceholderLocked("removed"));
            }
            if p.frame.is_none() {
                return Err(DockError::PanelDetached(panel));
            }
            tree.detach_panel(panel)?;
            tree.release_panel(panel);
            Ok(())
        })
    }

    /// Redock a panel. The panel's last laid-out size becomes the size hint
    /// when no explicit size or fraction is given.
    pub fn move_panel(
        &mut self,
        panel: PanelId,
        location: DockLocation,
        target: Option<DockTarget>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        self.transact("move", |tree| {
            let p = tree.panel_ref(panel)?;
            if p.is_placeholder() {
                return Err(DockError::PlaceholderLocked("moved"));
            }
            let source = p.frame.ok_or(DockError::PanelDetached(panel))?;
            if !p.is_moveable() {
                return Err(DockError::NotPermitted {
                    panel,
                    action: "moved",
                });
            }
            let mut options = options;
            if options.fraction.is_none()
                && options.size.is_none()
                && let (Some(size), Some(orientation)) =
                    (p.last_size, location.split_orientation())
            {
                options.size = Some(orientation.primary(size));
            }

            let target = tree.resolve_target(target)?;
            let source_frame = tree.frame_ref(source)?;
            let source_len = source_frame.panels.len();

            if location == DockLocation::Stacked
                && target.and_then(|t| tree.stack_frame_for(t)) == Some(source)
            {
                let from = source_frame.position_of(panel).unwrap_or(0);
                let to = options.tab_index.unwrap_or(source_len).min(source_len - 1);
                tree.move_tab_in(source, from, to)?;
                return Ok(source);
            }
            if source_len == 1 {
                let floating_source = source_frame.floating;
                if target == Some(source) {
                    return Ok(source);
                }
                if floating_source
                    && matches!(location, DockLocation::Float | DockLocation::Modal)
                {
                    tree.float_in(source, options.rect, location == DockLocation::Modal)?;
                    return Ok(source);
                }
            }

            tree.detach_panel(panel)?;
            let frame = tree.insert_alone_in(panel, location, target, options)?;
            if options.activate || tree.frame_ref(frame)?.panels.len() == 1 {
                tree.activate_panel(frame, panel)?;
            }
            Ok(frame)
        })
    }

    /// Move a whole frame. Split locations move the frame node itself;
    /// `Stacked` merges its tabs into the target frame; `Float`/`Modal`
    /// detach it into the floating list.
    pub fn move_frame(
        &mut self,
        frame: NodeId,
        location: DockLocation,
        target: Option<DockTarget>,
    ) -> Result<()> {
        self.transact("move_frame", |tree| {
            let f = tree.frame_ref(frame)?;
            if f.panels.iter().any(|p| Some(*p) == tree.placeholder) {
                return Err(DockError::PlaceholderLocked("moved"));
            }
            if let Some(fixed) = f
                .panels
                .iter()
                .copied()
                .find(|p| tree.panels.get(p).is_some_and(|panel| !panel.is_moveable()))
            {
                return Err(DockError::NotPermitted {
                    panel: fixed,
                    action: "moved",
                });
            }
            if tree.is_drawer_frame(frame) {
                return Err(DockError::InvalidTarget {
                    location,
                    target: frame.to_string(),
                    reason: "drawer frames move panel by panel",
                });
            }
            let target = tree.resolve_target(target)?;

            match location {
                DockLocation::Float | DockLocation::Modal => {
                    tree.float_in(frame, None, location == DockLocation::Modal)
                }
                DockLocation::Stacked => {
                    match target.and_then(|t| tree.stack_frame_for(t)) {
                        Some(dest) if dest == frame => Ok(()),
                        Some(dest) => tree.merge_frame(frame, dest, None),
                        None => tree.relocate_frame(frame, DockLocation::Right, target),
                    }
                }
                _ => tree.relocate_frame(frame, location, target),
            }
        })
    }

    /// Float a docked frame, or reposition and raise a floating one.
    pub fn float_frame(&mut self, frame: NodeId, rect: Option<Rect>) -> Result<()> {
        self.transact("float_frame", |tree| {
            let modal = tree.frame_ref(frame)?.modal;
            if tree.is_placeholder_frame(frame) {
                return Err(DockError::PlaceholderLocked("floated"));
            }
            if tree.is_drawer_frame(frame) {
                return Err(DockError::InvalidTarget {
                    location: DockLocation::Float,
                    target: frame.to_string(),
                    reason: "drawer frames cannot float",
                });
            }
            tree.float_in(frame, rect, modal)
        })
    }

    /// Reorder a tab within a frame.
    pub fn move_tab(&mut self, frame: NodeId, from: usize, to: usize) -> Result<()> {
        self.transact("move_tab", |tree| tree.move_tab_in(frame, from, to))
    }

    /// Switch a frame's active tab. In a collapsed drawer this expands it.
    pub fn set_active_tab(&mut self, frame: NodeId, index: usize) -> Result<()> {
        self.transact("set_active_tab", |tree| {
            let len = tree.frame_ref(frame)?.panels.len();
            if index >= len {
                return Err(DockError::TabOutOfRange { frame, index, len });
            }
            if let Some(edge) = tree.drawer_edge_of_frame(frame)
                && tree.is_collapsed_frame(frame)
            {
                return tree.expand_in(edge, Some(index));
            }
            if tree.frame_mut(frame)?.set_active_tab(index).is_some() {
                tree.emit(LayoutEvent::TabChanged {
                    frame,
                    active: Some(index),
                });
            }
            Ok(())
        })
    }

    /// Change where a frame draws its tabs.
    pub fn set_tab_orientation(&mut self, frame: NodeId, orientation: TabOrientation) -> Result<()> {
        self.frame_mut(frame)?.tab_orientation = orientation;
        Ok(())
    }

    /// Show or hide a frame's title bar.
    pub fn set_title_visible(&mut self, frame: NodeId, visible: bool) -> Result<()> {
        self.frame_mut(frame)?.show_title = visible;
        Ok(())
    }

    /// Set a splitter's divider directly, cancelling any animation.
    pub fn set_splitter_position(&mut self, splitter: NodeId, fraction: f64) -> Result<()> {
        self.splitter_mut(splitter)?.set_position(fraction);
        Ok(())
    }

    /// Change a panel's size limits.
    pub fn set_panel_limits(&mut self, panel: PanelId, min: SizeBox, max: SizeBox) -> Result<()> {
        self.panels
            .get_mut(&panel)
            .ok_or(DockError::UnknownPanel(panel))?
            .set_size_limits(min, max);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Drawers
    // ---------------------------------------------------------------------

    /// Add an empty, collapsed drawer on `edge`.
    pub fn create_collapser(&mut self, edge: DockEdge) -> Result<NodeId> {
        self.transact("create_collapser", |tree| {
            if tree.collapsers.contains_key(&edge) {
                return Err(DockError::DuplicateCollapser(edge));
            }
            Ok(tree.create_collapser_in(edge))
        })
    }

    /// Remove the drawer on `edge`, releasing every panel inside it.
    pub fn remove_collapser(&mut self, edge: DockEdge) -> Result<()> {
        self.transact("remove_collapser", |tree| {
            let collapser = tree
                .collapser(edge)
                .ok_or(DockError::MissingCollapser(edge))?;
            let frame = tree.collapser_ref(collapser)?.frame;
            for panel in tree.frame_ref(frame)?.panels.clone() {
                tree.detach_panel(panel)?;
                tree.release_panel(panel);
            }
            tree.unwrap_drawer(edge);
            Ok(())
        })
    }

    /// Move a collapsible panel into the drawer on `edge`, creating the
    /// drawer when needed.
    pub fn collapse_panel(&mut self, panel: PanelId, edge: DockEdge) -> Result<NodeId> {
        self.transact("collapse_panel", |tree| {
            let p = tree.panel_ref(panel)?;
            if p.is_placeholder() {
                return Err(DockError::PlaceholderLocked("collapsed"));
            }
            if !p.flags.contains(PanelFlags::COLLAPSIBLE) {
                return Err(DockError::NotPermitted {
                    panel,
                    action: "collapsed",
                });
            }
            if p.frame.is_some() {
                tree.detach_panel(panel)?;
            }
            let collapser = match tree.collapser(edge) {
                Some(existing) => existing,
                None => tree.create_collapser_in(edge),
            };
            let frame = tree.collapser_ref(collapser)?.frame;
            let expanded = tree.collapser_ref(collapser)?.expanded;
            tree.attach_panel(frame, panel, None, expanded)?;
            Ok(frame)
        })
    }

    /// Close the drawer on `edge` down to its tab strip.
    pub fn collapse(&mut self, edge: DockEdge) -> Result<()> {
        self.transact("collapse", |tree| tree.collapse_in(edge))
    }

    /// Open the drawer on `edge`, showing `tab` (or the previously active tab,
    /// or the first one) and sliding the divider to the open size.
    pub fn expand(&mut self, edge: DockEdge, tab: Option<usize>) -> Result<()> {
        self.transact("expand", |tree| tree.expand_in(edge, tab))
    }

    /// Override the drawer's open size.
    pub fn set_open_size(&mut self, edge: DockEdge, size: Option<f64>) -> Result<()> {
        let collapser = self
            .collapser(edge)
            .ok_or(DockError::MissingCollapser(edge))?;
        self.collapser_mut(collapser)?.open_size = size.map(|s| s.max(0.0));
        Ok(())
    }

    /// Step every running divider animation; returns whether any continue.
    pub fn advance_animations(&mut self) -> bool {
        let mut running = false;
        for node in self.nodes.values_mut() {
            if let NodeKind::Splitter(splitter) = &mut node.kind
                && splitter.animation.is_some()
            {
                running |= splitter.advance() == crate::splitter::AnimationStatus::Continuing;
            }
        }
        running
    }

    // ---------------------------------------------------------------------
    // Transaction
    // ---------------------------------------------------------------------

    pub(crate) fn transact<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let mut working = self.clone();
        match f(&mut working) {
            Ok(out) => {
                working.rebalance();
                if let Err(issues) = working.validate() {
                    warn!(target: "dockyard.tree", op, ?issues, "tree inconsistent after mutation");
                }
                debug!(target: "dockyard.tree", op, nodes = working.nodes.len(), "mutation applied");
                *self = working;
                Ok(out)
            }
            Err(err) => {
                debug!(target: "dockyard.tree", op, %err, "mutation rejected");
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Mutation internals
    // ---------------------------------------------------------------------

    fn alloc_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.next_node;
        self.next_node = id.successor();
        self.nodes.insert(id, Node::new(id, parent, kind));
        id
    }

    fn alloc_panel(&mut self) -> PanelId {
        let id = self.next_panel;
        self.next_panel = id.successor();
        id
    }

    pub(crate) fn panel_ref(&self, id: PanelId) -> Result<&Panel> {
        self.panels.get(&id).ok_or(DockError::UnknownPanel(id))
    }

    pub(crate) fn frame_ref(&self, id: NodeId) -> Result<&Frame> {
        let node = self.nodes.get(&id).ok_or(DockError::UnknownNode(id))?;
        node.kind.as_frame().ok_or(DockError::NotAFrame(id))
    }

    pub(crate) fn frame_mut(&mut self, id: NodeId) -> Result<&mut Frame> {
        let node = self.nodes.get_mut(&id).ok_or(DockError::UnknownNode(id))?;
        node.kind.as_frame_mut().ok_or(DockError::NotAFrame(id))
    }

    pub(crate) fn splitter_mut(&mut self, id: NodeId) -> Result<&mut Splitter> {
        let node = self.nodes.get_mut(&id).ok_or(DockError::UnknownNode(id))?;
        node.kind.as_splitter_mut().ok_or(DockError::NotASplitter(id))
    }

    fn collapser_ref(&self, id: NodeId) -> Result<&Collapser> {
        self.nodes
            .get(&id)
            .and_then(|node| node.kind.as_collapser())
            .ok_or(DockError::UnknownNode(id))
    }

    fn collapser_mut(&mut self, id: NodeId) -> Result<&mut Collapser> {
        self.nodes
            .get_mut(&id)
            .and_then(|node| node.kind.as_collapser_mut())
            .ok_or(DockError::UnknownNode(id))
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
    }

    pub(crate) fn holder_of(&self, id: NodeId) -> Option<Holder> {
        let node = self.nodes.get(&id)?;
        match node.parent {
            Some(parent) => match &self.nodes.get(&parent)?.kind {
                NodeKind::Splitter(splitter) => {
                    splitter.slot_of(id).map(|slot| Holder::Slot(parent, slot))
                }
                NodeKind::Collapser(_) => Some(Holder::Drawer(parent)),
                NodeKind::Frame(_) => None,
            },
            None if self.root == Some(id) => Some(Holder::Root),
            None if self.floating.contains(&id) => Some(Holder::Floating),
            None if self.modal.contains(&id) => Some(Holder::Modal),
            None => None,
        }
    }

    fn holder_child(&self, holder: Holder) -> Option<NodeId> {
        match holder {
            Holder::Root => self.root,
            Holder::Slot(splitter, slot) => self.splitter(splitter).and_then(|s| s.child(slot)),
            Holder::Drawer(collapser) => self.collapser_node(collapser).map(|c| c.frame),
            Holder::Floating | Holder::Modal => None,
        }
    }

    /// Put `child` into a single-occupant holder.
    fn put(&mut self, holder: Holder, child: Option<NodeId>) {
        let parent = match holder {
            Holder::Root => {
                self.root = child;
                None
            }
            Holder::Slot(splitter, slot) => {
                if let Some(s) = self.nodes.get_mut(&splitter).and_then(|n| n.kind.as_splitter_mut()) {
                    s.set_child(slot, child);
                }
                Some(splitter)
            }
            Holder::Drawer(collapser) => {
                if let (Some(frame), Some(c)) = (
                    child,
                    self.nodes
                        .get_mut(&collapser)
                        .and_then(|n| n.kind.as_collapser_mut()),
                ) {
                    c.frame = frame;
                }
                Some(collapser)
            }
            Holder::Floating => {
                if let Some(child) = child {
                    self.floating.push(child);
                }
                None
            }
            Holder::Modal => {
                if let Some(child) = child {
                    self.modal.push(child);
                }
                None
            }
        };
        if let Some(child) = child {
            self.set_parent(child, parent);
        }
    }

    /// Remove a node from wherever it is held, leaving it orphaned in the
    /// arena.
    fn take_out(&mut self, id: NodeId) -> Option<Holder> {
        let holder = self.holder_of(id)?;
        match holder {
            Holder::Floating => self.floating.retain(|f| *f != id),
            Holder::Modal => self.modal.retain(|f| *f != id),
            Holder::Drawer(_) => return None,
            other => self.put(other, None),
        }
        self.set_parent(id, None);
        Some(holder)
    }

    /// Substitute `new` for `old` in `old`'s holder.
    fn replace_node(&mut self, old: NodeId, new: Option<NodeId>) {
        let Some(holder) = self.holder_of(old) else {
            return;
        };
        match holder {
            Holder::Floating | Holder::Modal => {
                let list = if holder == Holder::Floating {
                    &mut self.floating
                } else {
                    &mut self.modal
                };
                match (list.iter().position(|f| *f == old), new) {
                    (Some(at), Some(new)) => list[at] = new,
                    (Some(at), None) => {
                        list.remove(at);
                    }
                    (None, _) => {}
                }
                if let Some(new) = new {
                    self.set_parent(new, None);
                }
            }
            other => self.put(other, new),
        }
        self.set_parent(old, None);
    }

    /// Holder of the main region: the content slot of the innermost drawer
    /// splitter, or the root.
    pub(crate) fn main_holder(&self) -> Holder {
        let mut holder = Holder::Root;
        while let Some(current) = self.holder_child(holder) {
            match self.splitter(current).and_then(|s| s.drawer) {
                Some(edge) => holder = Holder::Slot(current, content_slot(edge)),
                None => break,
            }
        }
        holder
    }

    fn drawer_splitter_of(&self, edge: DockEdge) -> Option<NodeId> {
        let collapser = self.collapser(edge)?;
        self.nodes.get(&collapser)?.parent
    }

    pub(crate) fn drawer_edge_of_frame(&self, frame: NodeId) -> Option<DockEdge> {
        let parent = self.nodes.get(&frame)?.parent?;
        self.collapser_node(parent).map(|c| c.edge)
    }

    fn check_insertable(&self, panel: PanelId) -> Result<()> {
        let p = self.panel_ref(panel)?;
        if p.is_placeholder() {
            return Err(DockError::PlaceholderLocked("moved"));
        }
        if p.frame.is_some() {
            return Err(DockError::PanelAttached(panel));
        }
        Ok(())
    }

    pub(crate) fn resolve_target(&self, target: Option<DockTarget>) -> Result<Option<NodeId>> {
        match target {
            None => Ok(None),
            Some(DockTarget::Panel(panel)) => {
                let p = self.panel_ref(panel)?;
                p.frame.map(Some).ok_or(DockError::PanelDetached(panel))
            }
            Some(DockTarget::Node(node)) if self.nodes.contains_key(&node) => Ok(Some(node)),
            Some(DockTarget::Node(node)) => Err(DockError::UnknownNode(node)),
        }
    }

    /// Frame that receives tabs stacked onto `node`.
    pub(crate) fn stack_frame_for(&self, node: NodeId) -> Option<NodeId> {
        match &self.nodes.get(&node)?.kind {
            NodeKind::Frame(_) => Some(node),
            NodeKind::Collapser(collapser) => Some(collapser.frame),
            NodeKind::Splitter(_) => None,
        }
    }

    fn insert_alone_in(
        &mut self,
        panel: PanelId,
        location: DockLocation,
        target: Option<NodeId>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        match location {
            DockLocation::Stacked => self.insert_grouped_in(panel, target, options),
            DockLocation::Float | DockLocation::Modal => {
                self.insert_floating(panel, location == DockLocation::Modal, options.rect)
            }
            _ => {
                let anchor = target.or_else(|| self.main_root());
                if let Some(existing) = anchor
                    && self.is_placeholder_frame(existing)
                {
                    self.attach_panel(existing, panel, None, true)?;
                    return Ok(existing);
                }
                if let Some(target) = target {
                    self.check_splittable(target, location)?;
                }
                let frame = self.alloc_node(NodeKind::Frame(Frame::new()), None);
                self.attach_panel(frame, panel, None, true)?;
                self.split_with(frame, location, target, options)?;
                Ok(frame)
            }
        }
    }

    fn insert_grouped_in(
        &mut self,
        panel: PanelId,
        target: Option<NodeId>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        match target.and_then(|t| self.stack_frame_for(t)) {
            Some(frame) => {
                let activate = options.activate && !self.is_collapsed_frame(frame);
                self.attach_panel(frame, panel, options.tab_index, activate)?;
                Ok(frame)
            }
            None => self.insert_alone_in(panel, DockLocation::Right, target, options),
        }
    }

    fn insert_floating(&mut self, panel: PanelId, modal: bool, rect: Option<Rect>) -> Result<NodeId> {
        let frame = self.alloc_node(NodeKind::Frame(Frame::floating(modal)), None);
        self.attach_panel(frame, panel, None, true)?;
        let rect = rect.unwrap_or_else(|| self.default_floating_rect());
        if let Some(node) = self.nodes.get_mut(&frame) {
            node.rect = rect;
        }
        self.put(if modal { Holder::Modal } else { Holder::Floating }, Some(frame));
        debug!(target: "dockyard.tree", %frame, modal, "floating frame created");
        Ok(frame)
    }

    fn default_floating_rect(&self) -> Rect {
        let size = self.config.floating_size;
        let center = self.area.center();
        Rect::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    fn check_splittable(&self, target: NodeId, location: DockLocation) -> Result<()> {
        let node = self.nodes.get(&target).ok_or(DockError::UnknownNode(target))?;
        let refuse = |reason| DockError::InvalidTarget {
            location,
            target: target.to_string(),
            reason,
        };
        match &node.kind {
            NodeKind::Frame(frame) if frame.floating => Err(refuse("floating frames cannot be split")),
            NodeKind::Frame(_) if self.is_drawer_frame(target) => {
                Err(refuse("drawer frames cannot be split"))
            }
            NodeKind::Collapser(_) => Err(refuse("drawers cannot be split")),
            NodeKind::Splitter(splitter) if splitter.drawer.is_some() => {
                Err(refuse("drawer splitters cannot be split"))
            }
            _ => Ok(()),
        }
    }

    /// Wrap `target` (default: the main region) and `incoming` in a new
    /// splitter ordered by `location`.
    fn split_with(
        &mut self,
        incoming: NodeId,
        location: DockLocation,
        target: Option<NodeId>,
        options: InsertOptions,
    ) -> Result<()> {
        let orientation = location
            .split_orientation()
            .ok_or(DockError::InvalidTarget {
                location,
                target: incoming.to_string(),
                reason: "not a split location",
            })?;
        let target = match target.or_else(|| self.main_root()) {
            Some(target) => target,
            None => {
                let holder = self.main_holder();
                self.put(holder, Some(incoming));
                return Ok(());
            }
        };
        self.check_splittable(target, location)?;
        if self.holder_of(target).is_none() {
            return Err(DockError::InvalidTarget {
                location,
                target: target.to_string(),
                reason: "target is not part of the layout",
            });
        }

        let position = self.split_position(incoming, target, location, orientation, &options);
        let (first, second) = if location.incoming_first() {
            (incoming, target)
        } else {
            (target, incoming)
        };
        let mut splitter = Splitter::new(orientation, position);
        splitter.first = Some(first);
        splitter.second = Some(second);
        let id = self.alloc_node(NodeKind::Splitter(splitter), None);
        if let Some(rect) = self.nodes.get(&target).map(|n| n.rect)
            && let Some(node) = self.nodes.get_mut(&id)
        {
            node.rect = rect;
        }
        self.replace_node(target, Some(id));
        self.set_parent(first, Some(id));
        self.set_parent(second, Some(id));
        debug!(target: "dockyard.tree", splitter = %id, ?location, %target, position, "split inserted");
        Ok(())
    }

    fn split_position(
        &self,
        incoming: NodeId,
        target: NodeId,
        location: DockLocation,
        orientation: Orientation,
        options: &InsertOptions,
    ) -> f64 {
        if let Some(fraction) = options.fraction {
            return fraction;
        }
        let container = self
            .nodes
            .get(&target)
            .map(|n| n.rect)
            .filter(|rect| !rect.is_empty())
            .unwrap_or(self.area);
        let available = orientation.extent(container) - self.config.splitter_size;
        if available <= 0.0 {
            return 0.5;
        }
        if let Some(size) = options.size {
            let incoming_extent = size.clamp(0.0, available);
            let first = if location.incoming_first() {
                incoming_extent
            } else {
                available - incoming_extent
            };
            return first / available;
        }

        let bounds = |id: NodeId| {
            self.nodes.get(&id).map_or((0.0, f64::INFINITY), |node| {
                (
                    orientation.primary(node.min_size(self)),
                    orientation.primary(node.max_size(self)),
                )
            })
        };
        let incoming_side = (self.desired_extent(incoming, orientation), bounds(incoming));
        let target_side = (self.desired_extent(target, orientation), bounds(target));
        let (first, second) = if location.incoming_first() {
            (incoming_side, target_side)
        } else {
            (target_side, incoming_side)
        };
        best_position(available, first.0, second.0, first.1, second.1)
    }

    /// Preferred extent of a subtree along `orientation`.
    pub(crate) fn desired_extent(&self, id: NodeId, orientation: Orientation) -> f64 {
        let Some(node) = self.nodes.get(&id) else {
            return 0.0;
        };
        match &node.kind {
            NodeKind::Frame(frame) => {
                let content = frame
                    .panels
                    .iter()
                    .filter_map(|p| self.panels.get(p))
                    .map(|p| orientation.primary(p.desired_size))
                    .fold(0.0, f64::max);
                let title = if frame.tab_orientation.consumed_axis() == orientation {
                    frame.title_thickness(self.config.title_bar_size)
                } else {
                    0.0
                };
                content + title
            }
            NodeKind::Splitter(splitter) => {
                let children = splitter
                    .child_nodes()
                    .into_iter()
                    .map(|child| self.desired_extent(child, orientation));
                if splitter.orientation == orientation {
                    children.sum::<f64>() + splitter.bar_size(self.config.splitter_size)
                } else {
                    children.fold(0.0, f64::max)
                }
            }
            NodeKind::Collapser(collapser) => {
                if collapser.edge.orientation() == orientation && collapser.expanded {
                    collapser.effective_open_size(self)
                } else if collapser.edge.orientation() == orientation {
                    self.config.collapser_strip_size
                } else {
                    self.desired_extent(collapser.frame, orientation)
                }
            }
        }
    }

    /// Add a panel to a frame and point it back at the frame.
    fn attach_panel(
        &mut self,
        frame: NodeId,
        panel: PanelId,
        index: Option<usize>,
        activate: bool,
    ) -> Result<usize> {
        let at = self.frame_mut(frame)?.add_panel(panel, index);
        if let Some(p) = self.panels.get_mut(&panel) {
            p.frame = Some(frame);
        }
        if self.is_collapsed_frame(frame) {
            self.frame_mut(frame)?.active = None;
        } else if activate {
            self.activate_panel(frame, panel)?;
        }
        Ok(at)
    }

    fn activate_panel(&mut self, frame: NodeId, panel: PanelId) -> Result<()> {
        let f = self.frame_mut(frame)?;
        let Some(index) = f.position_of(panel) else {
            return Ok(());
        };
        if f.set_active_tab(index).is_some() {
            self.emit(LayoutEvent::TabChanged {
                frame,
                active: Some(index),
            });
        }
        Ok(())
    }

    /// Take a panel out of its frame. The frame is left in place even when
    /// empty; the rebalance sweep removes it.
    fn detach_panel(&mut self, panel: PanelId) -> Result<()> {
        let frame = self
            .panel_ref(panel)?
            .frame
            .ok_or(DockError::PanelDetached(panel))?;
        let f = self.frame_mut(frame)?;
        let before = f.active;
        let remaining = f.remove_panel(panel);
        let after = f.active;
        if before != after && remaining {
            self.emit(LayoutEvent::TabChanged { frame, active: after });
        }
        if let Some(p) = self.panels.get_mut(&panel) {
            p.frame = None;
        }
        self.set_visible(panel, false);
        if !remaining && let Some(edge) = self.drawer_edge_of_frame(frame) {
            self.collapse_in(edge)?;
        }
        Ok(())
    }

    /// Retain a detached persistent panel or destroy anything else.
    fn release_panel(&mut self, panel: PanelId) {
        let persistent = self.panels.get(&panel).is_some_and(|p| p.persistent);
        if persistent {
            debug!(target: "dockyard.tree", %panel, "persistent panel retained");
            self.emit(LayoutEvent::PanelRetained(panel));
        } else {
            self.panels.remove(&panel);
            debug!(target: "dockyard.tree", %panel, "panel destroyed");
            self.emit(LayoutEvent::PanelDestroyed(panel));
        }
    }

    fn set_visible(&mut self, panel: PanelId, visible: bool) {
        let Some(p) = self.panels.get_mut(&panel) else {
            return;
        };
        if p.visible != visible {
            p.visible = visible;
            self.emit(LayoutEvent::VisibilityChanged { panel, visible });
        }
    }

    fn move_tab_in(&mut self, frame: NodeId, from: usize, to: usize) -> Result<()> {
        let f = self.frame_mut(frame)?;
        let len = f.panels.len();
        for index in [from, to] {
            if index >= len {
                return Err(DockError::TabOutOfRange { frame, index, len });
            }
        }
        let before = f.active;
        f.move_tab(from, to);
        let after = f.active;
        if before != after {
            self.emit(LayoutEvent::TabChanged { frame, active: after });
        }
        Ok(())
    }

    /// Move every tab of `source` into `dest`, keeping the source's active
    /// panel active.
    fn merge_frame(&mut self, source: NodeId, dest: NodeId, index: Option<usize>) -> Result<()> {
        let f = self.frame_ref(source)?;
        let panels = f.panels.clone();
        let active = f.active_panel();
        let mut at = index;
        for panel in panels {
            self.detach_panel(panel)?;
            let landed = self.attach_panel(dest, panel, at, false)?;
            at = Some(landed + 1);
        }
        if let Some(active) = active
            && !self.is_collapsed_frame(dest)
        {
            self.activate_panel(dest, active)?;
        }
        Ok(())
    }

    /// Move a frame node next to `target`.
    fn relocate_frame(
        &mut self,
        frame: NodeId,
        location: DockLocation,
        target: Option<NodeId>,
    ) -> Result<()> {
        if let Some(target) = target {
            if target == frame {
                return Ok(());
            }
            self.check_splittable(target, location)?;
        }
        if target.is_none() && self.main_root() == Some(frame) {
            return Ok(());
        }
        self.take_out(frame);
        let f = self.frame_mut(frame)?;
        f.floating = false;
        f.modal = false;
        self.split_with(frame, location, target, InsertOptions::default())
    }

    fn float_in(&mut self, frame: NodeId, rect: Option<Rect>, modal: bool) -> Result<()> {
        let current = self.nodes.get(&frame).map(|n| n.rect).unwrap_or_default();
        let was_floating = self.frame_ref(frame)?.floating;
        let rect = match rect {
            Some(rect) => rect,
            None if was_floating || !current.is_empty() => current,
            None => self.default_floating_rect(),
        };
        self.take_out(frame);
        let f = self.frame_mut(frame)?;
        f.floating = true;
        f.modal = modal;
        if let Some(node) = self.nodes.get_mut(&frame) {
            node.rect = rect;
        }
        self.put(if modal { Holder::Modal } else { Holder::Floating }, Some(frame));
        debug!(target: "dockyard.tree", %frame, modal, "frame floated");
        Ok(())
    }

    fn create_collapser_in(&mut self, edge: DockEdge) -> NodeId {
        let mut frame = Frame::new();
        frame.tab_orientation = match edge {
            DockEdge::Left => TabOrientation::Left,
            DockEdge::Right => TabOrientation::Right,
            DockEdge::Bottom => TabOrientation::Bottom,
        };
        let frame_id = self.alloc_node(NodeKind::Frame(frame), None);
        let collapser = Collapser::new(frame_id, edge);
        let closed = collapser.closed_position();
        let collapser_id = self.alloc_node(NodeKind::Collapser(collapser), None);
        self.set_parent(frame_id, Some(collapser_id));

        // Descend past drawers that nest outside this one.
        let mut holder = Holder::Root;
        while let Some(current) = self.holder_child(holder) {
            match self.splitter(current).and_then(|s| s.drawer) {
                Some(outer) if outer.rank() < edge.rank() => {
                    holder = Holder::Slot(current, content_slot(outer));
                }
                _ => break,
            }
        }
        let content = self.holder_child(holder);

        let mut drawer = Splitter::new(edge.orientation(), closed);
        drawer.drawer = Some(edge);
        drawer.set_child(content_slot(edge), content);
        drawer.set_child(collapser_slot(edge), Some(collapser_id));
        let drawer_id = self.alloc_node(NodeKind::Splitter(drawer), None);
        self.set_parent(collapser_id, Some(drawer_id));
        if let Some(content) = content {
            self.set_parent(content, Some(drawer_id));
        }
        self.put(holder, Some(drawer_id));
        self.collapsers.insert(edge, collapser_id);
        debug!(target: "dockyard.tree", ?edge, collapser = %collapser_id, "collapser created");
        collapser_id
    }

    /// Remove the drawer splitter, collapser and drawer frame for `edge`,
    /// promoting the content into the drawer splitter's place.
    fn unwrap_drawer(&mut self, edge: DockEdge) {
        let Some(collapser) = self.collapsers.remove(&edge) else {
            return;
        };
        let frame = self.collapser_node(collapser).map(|c| c.frame);
        if let Some(drawer) = self.drawer_splitter_of_node(collapser) {
            let content = self
                .splitter(drawer)
                .and_then(|s| s.child(content_slot(edge)));
            self.replace_node(drawer, content);
            self.nodes.remove(&drawer);
        }
        if let Some(frame) = frame {
            self.nodes.remove(&frame);
        }
        self.nodes.remove(&collapser);
        debug!(target: "dockyard.tree", ?edge, "collapser reclaimed");
    }

    fn drawer_splitter_of_node(&self, collapser: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(&collapser)?.parent?;
        self.splitter(parent)
            .is_some_and(|s| s.drawer.is_some())
            .then_some(parent)
    }

    pub(crate) fn collapse_in(&mut self, edge: DockEdge) -> Result<()> {
        let collapser = self
            .collapser(edge)
            .ok_or(DockError::MissingCollapser(edge))?;
        let c = self.collapser_ref(collapser)?;
        let frame = c.frame;
        let closed = c.closed_position();
        let active = self.frame_ref(frame)?.active;
        let active_panel = self.frame_ref(frame)?.active_panel();
        {
            let c = self.collapser_mut(collapser)?;
            c.expanded = false;
            if active_panel.is_some() {
                c.last_active = active_panel;
            }
        }
        self.frame_mut(frame)?.active = None;
        if active.is_some() {
            self.emit(LayoutEvent::TabChanged { frame, active: None });
        }
        if let Some(drawer) = self.drawer_splitter_of(edge) {
            self.splitter_mut(drawer)?.set_position(closed);
        }
        debug!(target: "dockyard.tree", ?edge, "drawer collapsed");
        Ok(())
    }

    pub(crate) fn expand_in(&mut self, edge: DockEdge, tab: Option<usize>) -> Result<()> {
        let collapser = self
            .collapser(edge)
            .ok_or(DockError::MissingCollapser(edge))?;
        let c = self.collapser_ref(collapser)?;
        let frame = c.frame;
        let last_active = c.last_active;
        let len = self.frame_ref(frame)?.panels.len();
        if len == 0 {
            return Ok(());
        }
        if let Some(index) = tab
            && index >= len
        {
            return Err(DockError::TabOutOfRange { frame, index, len });
        }
        let remembered = last_active.and_then(|p| self.frame(frame)?.position_of(p));
        let index = tab.or(remembered).unwrap_or(0);
        let f = self.frame_mut(frame)?;
        let changed = f.active != Some(index);
        f.active = Some(index);
        if changed {
            self.emit(LayoutEvent::TabChanged {
                frame,
                active: Some(index),
            });
        }
        self.collapser_mut(collapser)?.expanded = true;

        let open = self.collapser_ref(collapser)?.effective_open_size(self);
        if let Some(drawer) = self.drawer_splitter_of(edge) {
            let rect = self.nodes.get(&drawer).map(|n| n.rect).unwrap_or_default();
            let orientation = edge.orientation();
            let extent = if orientation.extent(rect) > 0.0 {
                orientation.extent(rect)
            } else {
                orientation.extent(self.area)
            };
            let target = self.collapser_ref(collapser)?.open_position(open, extent);
            let steps = self.config.animation_steps;
            self.splitter_mut(drawer)?.animate_position(target, steps);
            debug!(target: "dockyard.tree", ?edge, open, target, "drawer expanding");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Rebalance
    // ---------------------------------------------------------------------

    /// Restore every structural invariant.
    pub(crate) fn rebalance(&mut self) {
        while self.sweep() {}
        self.sync_visibility();
    }

    fn sweep(&mut self) -> bool {
        self.drop_empty_frames()
            | self.simplify_splitters()
            | self.reclaim_orphaned_collapsers()
            | self.guard_placeholder()
    }

    fn drop_empty_frames(&mut self) -> bool {
        let empty: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.kind.as_frame().is_some_and(|f| f.panels.is_empty()))
            .map(|node| node.id)
            .filter(|id| !self.is_drawer_frame(*id))
            .collect();
        for id in &empty {
            self.take_out(*id);
            self.nodes.remove(id);
        }
        !empty.is_empty()
    }

    fn simplify_splitters(&mut self) -> bool {
        let splitters: Vec<(NodeId, Option<NodeId>, Option<NodeId>, Option<DockEdge>)> = self
            .nodes
            .values()
            .filter_map(|node| {
                node.kind
                    .as_splitter()
                    .map(|s| (node.id, s.first, s.second, s.drawer))
            })
            .collect();
        let mut changed = false;
        for (id, first, second, drawer) in splitters {
            if !self.nodes.contains_key(&id) {
                continue;
            }
            match drawer {
                Some(edge) => {
                    let collapser = self
                        .splitter(id)
                        .and_then(|s| s.child(collapser_slot(edge)));
                    let valid = collapser
                        .and_then(|c| self.collapser_node(c))
                        .is_some_and(|c| c.edge == edge)
                        && self.collapsers.get(&edge) == collapser.as_ref();
                    if !valid {
                        let content = self.splitter(id).and_then(|s| s.child(content_slot(edge)));
                        self.replace_node(id, content);
                        self.nodes.remove(&id);
                        changed = true;
                    }
                }
                None if first.is_none() || second.is_none() => {
                    let survivor = first.or(second);
                    if self.holder_of(id).is_some() {
                        self.replace_node(id, survivor);
                    } else if let Some(survivor) = survivor {
                        self.set_parent(survivor, None);
                    }
                    self.nodes.remove(&id);
                    debug!(target: "dockyard.tree", splitter = %id, ?survivor, "splitter simplified");
                    changed = true;
                }
                None => {}
            }
        }
        changed
    }

    fn reclaim_orphaned_collapsers(&mut self) -> bool {
        let orphaned: Vec<DockEdge> = self
            .collapsers
            .iter()
            .filter(|(edge, id)| {
                let held = self
                    .drawer_splitter_of_node(**id)
                    .and_then(|d| self.splitter(d))
                    .is_some_and(|s| s.drawer == Some(**edge));
                let shaped = self
                    .collapser_node(**id)
                    .is_some_and(|c| c.edge == **edge && self.frame(c.frame).is_some());
                !(held && shaped)
            })
            .map(|(edge, _)| *edge)
            .collect();
        for edge in &orphaned {
            if let Some(collapser) = self.collapser(*edge)
                && let Some(frame) = self.collapser_node(collapser).map(|c| c.frame)
            {
                let panels = self.frame(frame).map(|f| f.panels.clone()).unwrap_or_default();
                for panel in panels {
                    if let Some(p) = self.panels.get_mut(&panel) {
                        p.frame = None;
                    }
                    self.release_panel(panel);
                }
            }
            warn!(target: "dockyard.tree", ?edge, "reclaiming orphaned collapser");
            self.unwrap_drawer(*edge);
        }
        !orphaned.is_empty()
    }

    /// Whether any frame of the main region holds a panel other than the
    /// placeholder.
    fn main_has_content(&self) -> bool {
        self.main_root().is_some_and(|main| {
            self.subtree(main).into_iter().any(|id| {
                self.frame(id).is_some_and(|f| {
                    f.panels.iter().any(|p| Some(*p) != self.placeholder)
                })
            })
        })
    }

    /// Whether the placeholder panel should exist right now.
    #[must_use]
    pub fn placeholder_needed(&self) -> bool {
        let main_has_content = self.main_has_content();
        let any_moveable = self.root.is_some_and(|root| {
            self.subtree(root).into_iter().any(|id| {
                self.frame(id).is_some_and(|f| {
                    f.panels.iter().any(|p| {
                        self.panels
                            .get(p)
                            .is_some_and(|panel| panel.is_moveable() && !panel.is_placeholder())
                    })
                })
            })
        });
        !main_has_content || !any_moveable
    }

    fn guard_placeholder(&mut self) -> bool {
        let needed = self.placeholder_needed();
        match (needed, self.placeholder) {
            (false, Some(placeholder)) => {
                if self.frame_of(placeholder).is_some() {
                    // Detaching cannot fail for an attached panel.
                    let _ = self.detach_panel(placeholder);
                }
                self.panels.remove(&placeholder);
                self.placeholder = None;
                debug!(target: "dockyard.tree", "placeholder removed");
                self.emit(LayoutEvent::PanelDestroyed(placeholder));
                true
            }
            (true, None) => {
                let id = self.alloc_panel();
                self.panels.insert(id, Panel::placeholder(id));
                self.placeholder = Some(id);
                self.emit(LayoutEvent::PanelCreated(id));
                if !self.main_has_content() {
                    self.home_placeholder(id);
                }
                debug!(target: "dockyard.tree", panel = %id, "placeholder created");
                true
            }
            // The placeholder only occupies a frame while the main region has
            // nothing else; next to pinned user panels it stays detached.
            (true, Some(placeholder)) => {
                let attached = self.frame_of(placeholder).is_some();
                match (attached, self.main_has_content()) {
                    (false, false) => {
                        self.home_placeholder(placeholder);
                        true
                    }
                    (true, true) => {
                        let _ = self.detach_panel(placeholder);
                        debug!(target: "dockyard.tree", panel = %placeholder, "placeholder parked");
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Give the placeholder a frame of its own as the main region.
    fn home_placeholder(&mut self, placeholder: PanelId) {
        let host = self
            .main_root()
            .and_then(|main| self.subtree(main).into_iter().find(|id| self.frame(*id).is_some()));
        match host {
            Some(frame) => {
                let _ = self.attach_panel(frame, placeholder, None, false);
            }
            None => {
                let frame = self.alloc_node(NodeKind::Frame(Frame::new()), None);
                let _ = self.attach_panel(frame, placeholder, None, true);
                let holder = self.main_holder();
                self.put(holder, Some(frame));
            }
        }
    }

    /// A panel is visible exactly when it is the active tab of a frame that
    /// is not a collapsed drawer.
    fn sync_visibility(&mut self) {
        let ids: Vec<PanelId> = self.panels.keys().copied().collect();
        for id in ids {
            let visible = self.frame_of(id).is_some_and(|frame| {
                self.frame(frame).and_then(Frame::active_panel) == Some(id)
                    && !self.is_collapsed_frame(frame)
            });
            self.set_visible(id, visible);
        }
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Check every structural invariant and report all violations.
    pub fn validate(&self) -> std::result::Result<(), Vec<InvariantViolation>> {
        let mut issues = Vec::new();
        let mut seen: BTreeMap<NodeId, usize> = BTreeMap::new();

        let mut roots: Vec<NodeId> = self.root.into_iter().collect();
        roots.extend(self.floating.iter().copied());
        roots.extend(self.modal.iter().copied());
        let mut stack: Vec<(NodeId, Option<NodeId>)> = roots.into_iter().map(|r| (r, None)).collect();
        while let Some((id, expected_parent)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                if let Some(parent) = expected_parent {
                    issues.push(InvariantViolation::MissingChild {
                        node: parent,
                        child: id,
                    });
                }
                continue;
            };
            *seen.entry(id).or_default() += 1;
            if seen[&id] > 1 {
                issues.push(InvariantViolation::Shared(id));
                continue;
            }
            if node.parent != expected_parent {
                issues.push(InvariantViolation::ParentMismatch {
                    node: id,
                    recorded: node.parent,
                    actual: expected_parent,
                });
            }
            match &node.kind {
                NodeKind::Splitter(splitter) => {
                    match splitter.drawer {
                        Some(edge) => {
                            let collapser = splitter.child(collapser_slot(edge));
                            if collapser.and_then(|c| self.collapser_node(c)).is_none() {
                                issues.push(InvariantViolation::HollowSplitter(id));
                            }
                        }
                        None if splitter.first.is_none() || splitter.second.is_none() => {
                            issues.push(InvariantViolation::HollowSplitter(id));
                        }
                        None => {}
                    }
                    for child in splitter.child_nodes() {
                        stack.push((child, Some(id)));
                    }
                }
                NodeKind::Collapser(collapser) => {
                    let held = node
                        .parent
                        .and_then(|p| self.splitter(p))
                        .is_some_and(|s| s.drawer == Some(collapser.edge));
                    if !held || self.collapsers.get(&collapser.edge) != Some(&id) {
                        issues.push(InvariantViolation::LooseCollapser(id));
                    }
                    stack.push((collapser.frame, Some(id)));
                }
                NodeKind::Frame(frame) => {
                    self.validate_frame(id, frame, &mut issues);
                }
            }
        }

        for id in self.nodes.keys() {
            if !seen.contains_key(id) {
                issues.push(InvariantViolation::Unreachable(*id));
            }
        }
        for panel in self.panels.values() {
            if let Some(frame) = panel.frame
                && self.frame(frame).is_none_or(|f| !f.panels.contains(&panel.id))
            {
                issues.push(InvariantViolation::PanelOwnerMismatch {
                    panel: panel.id,
                    claimed: Some(frame),
                    actual: None,
                });
            }
        }
        if self.main_root().is_none() {
            issues.push(InvariantViolation::EmptyMainRegion);
        }
        let expected = self.placeholder_needed();
        if self.placeholder.is_some() != expected {
            issues.push(InvariantViolation::PlaceholderMismatch {
                present: self.placeholder.is_some(),
                expected,
            });
        }
        if let Some(frame) = self.placeholder.and_then(|p| self.frame_of(p))
            && !self.is_placeholder_frame(frame)
        {
            issues.push(InvariantViolation::PlaceholderShared(frame));
        }

        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    fn validate_frame(&self, id: NodeId, frame: &Frame, issues: &mut Vec<InvariantViolation>) {
        let drawer = self.is_drawer_frame(id);
        if frame.panels.is_empty() && !drawer {
            issues.push(InvariantViolation::EmptyFrame(id));
        }
        let len = frame.panels.len();
        let active_ok = match frame.active {
            None => len == 0 || self.is_collapsed_frame(id),
            Some(active) => active < len,
        };
        if !active_ok {
            issues.push(InvariantViolation::ActiveTabOutOfRange {
                frame: id,
                active: frame.active,
                len,
            });
        }
        for (index, panel) in frame.panels.iter().enumerate() {
            if frame.panels[..index].contains(panel) {
                issues.push(InvariantViolation::PanelListedTwice(*panel));
            }
            let claimed = self.panels.get(panel).and_then(|p| p.frame);
            if claimed != Some(id) {
                issues.push(InvariantViolation::PanelOwnerMismatch {
                    panel: *panel,
                    claimed,
                    actual: Some(id),
                });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Restore support
    // ---------------------------------------------------------------------

    /// Drop every node and attached panel, keeping retained panels.
    pub(crate) fn clear_layout(&mut self) {
        let attached: Vec<PanelId> = self
            .panels
            .values()
            .filter(|p| p.frame.is_some() || p.is_placeholder())
            .map(|p| p.id)
            .collect();
        for panel in attached {
            self.panels.remove(&panel);
            self.emit(LayoutEvent::PanelDestroyed(panel));
        }
        self.nodes.clear();
        self.bars.clear();
        self.root = None;
        self.floating.clear();
        self.modal.clear();
        self.collapsers.clear();
        self.placeholder = None;
    }

    pub(crate) fn new_frame_node(&mut self, frame: Frame) -> NodeId {
        self.alloc_node(NodeKind::Frame(frame), None)
    }

    pub(crate) fn new_splitter_node(&mut self, splitter: Splitter) -> NodeId {
        let children = splitter.child_nodes();
        let id = self.alloc_node(NodeKind::Splitter(splitter), None);
        for child in children {
            self.set_parent(child, Some(id));
        }
        id
    }

    pub(crate) fn attach_restored(&mut self, frame: NodeId, panel: PanelId) -> Result<()> {
        self.attach_panel(frame, panel, None, false).map(|_| ())
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.put(Holder::Root, root);
    }

    pub(crate) fn push_floating(&mut self, frame: NodeId, rect: Rect) {
        let modal = self.frame(frame).is_some_and(|f| f.modal);
        if let Some(node) = self.nodes.get_mut(&frame) {
            node.rect = rect;
        }
        self.put(if modal { Holder::Modal } else { Holder::Floating }, Some(frame));
    }

    pub(crate) fn ensure_collapser(&mut self, edge: DockEdge) -> NodeId {
        match self.collapser(edge) {
            Some(existing) => existing,
            None => self.create_collapser_in(edge),
        }
    }

    pub(crate) fn restore_collapser_state(
        &mut self,
        edge: DockEdge,
        expanded: bool,
        open_size: Option<f64>,
        active: Option<usize>,
        position: Option<f64>,
    ) -> Result<()> {
        let collapser = self
            .collapser(edge)
            .ok_or(DockError::MissingCollapser(edge))?;
        self.collapser_mut(collapser)?.open_size = open_size;
        if expanded {
            self.expand_in(edge, active)?;
            if let (Some(position), Some(drawer)) = (position, self.drawer_splitter_of(edge)) {
                self.splitter_mut(drawer)?.set_position(position);
            }
        } else {
            let frame = self.collapser_ref(collapser)?.frame;
            let remembered = active.and_then(|i| self.frame(frame)?.panels.get(i).copied());
            self.collapse_in(edge)?;
            // Collapsing records the frame's current tab; the snapshot wins.
            self.collapser_mut(collapser)?.last_active = remembered;
        }
        Ok(())
    }

    /// Drawer splitter divider for `edge`.
    #[must_use]
    pub fn drawer_position(&self, edge: DockEdge) -> Option<f64> {
        self.drawer_splitter_of(edge)
            .and_then(|d| self.splitter(d))
            .map(Splitter::position)
    }
}

/// Slot of a drawer splitter holding the collapser.
const fn collapser_slot(edge: DockEdge) -> Slot {
    if edge.collapser_first() {
        Slot::First
    } else {
        Slot::Second
    }
}

/// Slot of a drawer splitter holding the rest of the layout.
const fn content_slot(edge: DockEdge) -> Slot {
    if edge.collapser_first() {
        Slot::Second
    } else {
        Slot::First
    }
}
