//! The engine facade.
//!
//! [`DockManager`] owns everything a host needs: the tree, the panel type
//! registry, the configuration, the anchor detector, the drag machine and the
//! input coalescer. The host feeds it normalized input with
//! [`DockManager::handle_event`], drives time with [`DockManager::tick`] and
//! drains [`LayoutEvent`]s afterwards.
//!
//! Size-affecting calls only mark the layout dirty; the next `tick` that is at
//! least one response interval after the previous solve lays the tree out
//! again. Divider animations advance one step per tick.

use std::time::Duration;

use dockyard_core::event::{InputEvent, PointerButton, PointerEventKind, ResizeEvent};
use dockyard_core::event_coalescer::InputCoalescer;
use dockyard_core::geometry::{Point, Rect};
use tracing::{debug, warn};

use crate::anchor::{Anchor, AnchorDetector, AnchorQuery};
use crate::config::DockConfig;
use crate::drag::{DragEffect, DragMachine, DragSource};
use crate::error::{DockError, Result};
use crate::event::LayoutEvent;
use crate::frame::tab_at;
use crate::node::{
    DockEdge, DockLocation, DockTarget, NodeId, Orientation, PanelId, TabOrientation,
};
use crate::panel::{Panel, PanelInit};
use crate::registry::{PanelRegistry, PanelTypeOptions};
use crate::snapshot::{LayoutSnapshot, RestoreReport};
use crate::splitter::fraction_for_extent;
use crate::tree::{DockTree, InsertOptions};

/// What lies under a pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A splitter divider bar.
    Bar(NodeId),
    /// A frame's title band, on the given tab.
    Title { frame: NodeId, tab: usize },
    /// A drawer's tab strip; `tab` is the strip tab under the pointer.
    Strip { edge: DockEdge, tab: Option<usize> },
    /// A frame's content area.
    Content(NodeId),
}

#[derive(Debug)]
pub struct DockManager {
    tree: DockTree,
    registry: PanelRegistry,
    detector: AnchorDetector,
    drag: DragMachine,
    coalescer: InputCoalescer,
    dirty: bool,
    since_solve: Duration,
    focus: Option<PanelId>,
    ghost: Option<Anchor>,
    /// Pointer position when the active drag was armed.
    drag_origin: Option<Point>,
}

impl Default for DockManager {
    fn default() -> Self {
        Self::from_valid(DockConfig::default())
    }
}

impl DockManager {
    /// Build an engine over an empty layout.
    pub fn new(config: DockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: DockConfig) -> Self {
        Self {
            detector: AnchorDetector::new(&config),
            drag: DragMachine::new(config.drag_threshold),
            since_solve: config.response_rate(),
            tree: DockTree::new(config),
            registry: PanelRegistry::new(),
            coalescer: InputCoalescer::new(),
            dirty: true,
            focus: None,
            ghost: None,
            drag_origin: None,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &DockTree {
        &self.tree
    }

    #[must_use]
    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &DockConfig {
        self.tree.config()
    }

    /// Swap the configuration; the layout is re-solved on the next tick.
    pub fn set_config(&mut self, config: DockConfig) -> Result<()> {
        config.validate()?;
        self.detector = AnchorDetector::new(&config);
        self.drag.set_threshold(config.drag_threshold);
        self.tree.set_config(config);
        self.dirty = true;
        debug!(target: "dockyard.engine", "configuration replaced");
        Ok(())
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub const fn focus(&self) -> Option<PanelId> {
        self.focus
    }

    #[must_use]
    pub const fn ghost(&self) -> Option<Anchor> {
        self.ghost
    }

    #[must_use]
    pub const fn drag(&self) -> &DragMachine {
        &self.drag
    }

    /// Host-editable panel state: title, payload, scroll, flags.
    pub fn panel_mut(&mut self, panel: PanelId) -> Option<&mut Panel> {
        self.tree.panel_mut(panel)
    }

    pub fn drain_events(&mut self) -> Vec<LayoutEvent> {
        self.tree.drain_events()
    }

    // ---------------------------------------------------------------------
    // Registry and panels
    // ---------------------------------------------------------------------

    pub fn register<F>(&mut self, name: &str, options: PanelTypeOptions, factory: F) -> Result<()>
    where
        F: Fn(&mut PanelInit) + 'static,
    {
        self.registry.register(name, options, factory)
    }

    /// Create (or reuse a retained instance of) a panel of a registered type
    /// and dock it.
    pub fn add_panel(
        &mut self,
        panel_type: &str,
        location: DockLocation,
        target: Option<DockTarget>,
        options: InsertOptions,
    ) -> Result<PanelId> {
        let (init, type_options) = self.registry.instantiate(panel_type)?;
        let (panel, created) = match self.tree.retained_panel(panel_type) {
            Some(retained) => (retained, false),
            None => {
                if let Some(limit) = type_options.limit
                    && self.tree.count_of_type(panel_type) >= limit
                {
                    return Err(DockError::PanelLimitReached {
                        name: panel_type.to_owned(),
                        limit,
                    });
                }
                let id = self
                    .tree
                    .create_panel_with(panel_type, init, type_options.persistent)?;
                (id, true)
            }
        };
        if let Err(err) = self.tree.insert_alone(panel, location, target, options) {
            if created {
                self.tree.discard_panel(panel)?;
            }
            return Err(err);
        }
        debug!(target: "dockyard.engine", %panel, panel_type, ?location, reused = !created, "panel added");
        self.dirty = true;
        self.set_focus(Some(panel));
        Ok(panel)
    }

    /// Remove a panel from the layout.
    pub fn remove_panel(&mut self, panel: PanelId) -> Result<()> {
        self.mutate(|tree| tree.remove(panel))
    }

    pub fn move_panel(
        &mut self,
        panel: PanelId,
        location: DockLocation,
        target: Option<DockTarget>,
        options: InsertOptions,
    ) -> Result<NodeId> {
        self.mutate(|tree| tree.move_panel(panel, location, target, options))
    }

    pub fn move_frame(
        &mut self,
        frame: NodeId,
        location: DockLocation,
        target: Option<DockTarget>,
    ) -> Result<()> {
        self.mutate(|tree| tree.move_frame(frame, location, target))
    }

    pub fn float_frame(&mut self, frame: NodeId, rect: Option<Rect>) -> Result<()> {
        self.mutate(|tree| tree.float_frame(frame, rect))
    }

    pub fn set_active_tab(&mut self, frame: NodeId, index: usize) -> Result<()> {
        self.mutate(|tree| tree.set_active_tab(frame, index))
    }

    pub fn collapse_panel(&mut self, panel: PanelId, edge: DockEdge) -> Result<NodeId> {
        self.mutate(|tree| tree.collapse_panel(panel, edge))
    }

    pub fn collapse(&mut self, edge: DockEdge) -> Result<()> {
        self.mutate(|tree| tree.collapse(edge))
    }

    pub fn expand(&mut self, edge: DockEdge, tab: Option<usize>) -> Result<()> {
        self.mutate(|tree| tree.expand(edge, tab))
    }

    /// Focus a docked panel, bringing its tab to the front.
    pub fn focus_panel(&mut self, panel: PanelId) -> Result<()> {
        let frame = self
            .tree
            .panel(panel)
            .ok_or(DockError::UnknownPanel(panel))?
            .frame()
            .ok_or(DockError::PanelDetached(panel))?;
        let index = self
            .tree
            .frame(frame)
            .and_then(|f| f.position_of(panel))
            .ok_or(DockError::PanelDetached(panel))?;
        self.set_active_tab(frame, index)?;
        self.set_focus(Some(panel));
        Ok(())
    }

    fn mutate<T>(&mut self, f: impl FnOnce(&mut DockTree) -> Result<T>) -> Result<T> {
        let out = f(&mut self.tree)?;
        self.dirty = true;
        let lost = self
            .focus
            .is_some_and(|p| self.tree.panel(p).and_then(|panel| panel.frame()).is_none());
        if lost {
            self.set_focus(None);
        }
        Ok(out)
    }

    fn set_focus(&mut self, panel: Option<PanelId>) {
        if self.focus != panel {
            self.focus = panel;
            self.tree.emit(LayoutEvent::FocusChanged { panel });
        }
    }

    // ---------------------------------------------------------------------
    // Geometry and time
    // ---------------------------------------------------------------------

    pub fn set_area(&mut self, area: Rect) {
        if self.tree.area() != area {
            self.tree.set_area(area);
            self.dirty = true;
        }
    }

    /// Lay the tree out right away.
    pub fn solve_now(&mut self) {
        self.tree.solve();
        self.dirty = false;
        self.since_solve = Duration::ZERO;
    }

    /// Advance time: process coalesced input, step animations and re-solve
    /// when dirty and the response interval has elapsed. Returns whether a
    /// solve ran.
    pub fn tick(&mut self, elapsed: Duration) -> Result<bool> {
        self.process_pending()?;
        self.since_solve = self.since_solve.saturating_add(elapsed);
        let animating = self
            .tree
            .nodes()
            .any(|node| node.kind().as_splitter().is_some_and(|s| s.animation().is_some()));
        if animating {
            self.tree.advance_animations();
            self.dirty = true;
        }
        if self.dirty && self.since_solve >= self.config().response_rate() {
            self.solve_now();
            return Ok(true);
        }
        Ok(false)
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Feed one input event. Pointer moves and resize ticks are coalesced
    /// until the next [`Self::tick`]; everything else is processed at once,
    /// after any pending coalesced input.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        let Some(event) = self.coalescer.push(event) else {
            return Ok(());
        };
        let pending = self.process_pending();
        let current = self.process(event);
        pending.and(current)
    }

    /// Process every coalesced event; a failure does not drop the rest, and
    /// the first one is reported.
    fn process_pending(&mut self) -> Result<()> {
        let mut outcome = Ok(());
        for event in self.coalescer.flush() {
            let result = self.process(event);
            if outcome.is_ok() {
                outcome = result;
            }
        }
        outcome
    }

    fn process(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Down(PointerButton::Primary) => {
                    self.pointer_down(pointer.position())
                }
                PointerEventKind::Moved => self.update_drag(pointer.position()),
                PointerEventKind::Up(PointerButton::Primary) => {
                    if self.drag.is_active() {
                        self.commit_drag(pointer.position())
                    } else {
                        Ok(())
                    }
                }
                PointerEventKind::Down(_) | PointerEventKind::Up(_) => Ok(()),
            },
            InputEvent::Resize(ResizeEvent::Start) => Ok(()),
            InputEvent::Resize(ResizeEvent::Tick { width, height }) => {
                self.set_area(Rect::from_size(width, height));
                Ok(())
            }
            InputEvent::Resize(ResizeEvent::End { width, height }) => {
                self.set_area(Rect::from_size(width, height));
                self.solve_now();
                Ok(())
            }
            InputEvent::Cancel => {
                self.cancel_drag();
                Ok(())
            }
        }
    }

    /// What a press at `pointer` would hit.
    #[must_use]
    pub fn hit_test(&self, pointer: Point) -> Option<Hit> {
        let mut candidates = self.tree.anchor_candidates();
        candidates.sort_by(|a, b| b.z.cmp(&a.z));
        let modal_floor = candidates.iter().filter(|c| c.modal).map(|c| c.z).max();
        if let Some(floor) = modal_floor {
            candidates.retain(|c| c.z >= floor);
        }
        let frame_hit = |id: NodeId| {
            let band = self.tree.title_band(id).filter(|band| band.contains(pointer));
            match band {
                Some(band) => {
                    let frame = self.tree.frame(id)?;
                    let tab = tab_at(band, frame.tab_orientation(), pointer, frame.panels().len());
                    Some(Hit::Title { frame: id, tab })
                }
                None => Some(Hit::Content(id)),
            }
        };

        if let Some(top) = candidates.iter().find(|c| c.rect.contains(pointer))
            && (top.floating || top.modal)
        {
            return frame_hit(top.frame);
        }
        if modal_floor.is_some() {
            return None;
        }
        if let Some((id, _)) = self.tree.bars.iter().find(|(_, bar)| bar.contains(pointer)) {
            return Some(Hit::Bar(*id));
        }
        for edge in DockEdge::ALL {
            let Some(collapser) = self.tree.collapser(edge) else {
                continue;
            };
            let (Some(node), Some(c)) = (self.tree.node(collapser), self.tree.collapser_node(collapser))
            else {
                continue;
            };
            let (strip, _) = c.partition(node.rect(), self.config().collapser_strip_size);
            if strip.contains(pointer) {
                let count = self.tree.frame(c.frame()).map_or(0, |f| f.panels().len());
                let orientation = match edge {
                    DockEdge::Left | DockEdge::Right => TabOrientation::Left,
                    DockEdge::Bottom => TabOrientation::Bottom,
                };
                let tab = (count > 0).then(|| tab_at(strip, orientation, pointer, count));
                return Some(Hit::Strip { edge, tab });
            }
        }
        candidates
            .iter()
            .find(|c| c.rect.contains(pointer))
            .and_then(|c| frame_hit(c.frame))
    }

    fn pointer_down(&mut self, pointer: Point) -> Result<()> {
        if self.drag.is_active() {
            return Ok(());
        }
        match self.hit_test(pointer) {
            Some(Hit::Bar(node)) => {
                let start = self
                    .tree
                    .splitter(node)
                    .map(|s| s.position())
                    .ok_or(DockError::NotASplitter(node))?;
                self.begin_drag(DragSource::Splitter { node, start }, pointer)
            }
            Some(Hit::Title { frame, tab }) => {
                let Some(f) = self.tree.frame(frame) else {
                    return Ok(());
                };
                let source = if f.panels().len() > 1 || self.tree.is_drawer_frame(frame) {
                    match f.panels().get(tab) {
                        Some(panel) => DragSource::Panel(*panel),
                        None => return Ok(()),
                    }
                } else {
                    DragSource::Frame(frame)
                };
                self.begin_drag(source, pointer)
            }
            Some(Hit::Strip { edge, tab }) => {
                let drawer = self.tree.collapser(edge).and_then(|c| self.tree.collapser_node(c));
                let expanded = drawer.is_some_and(|c| c.is_expanded());
                let active = drawer
                    .and_then(|c| self.tree.frame(c.frame()))
                    .and_then(|f| f.active());
                if expanded && (tab.is_none() || tab == active) {
                    self.collapse(edge)
                } else {
                    self.expand(edge, tab)
                }
            }
            Some(Hit::Content(frame)) => {
                let active = self.tree.frame(frame).and_then(|f| f.active_panel());
                let focusable = active.filter(|p| self.tree.panel(*p).is_some_and(|p| !p.is_placeholder()));
                self.set_focus(focusable);
                Ok(())
            }
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------------
    // Drags
    // ---------------------------------------------------------------------

    fn begin_drag(&mut self, source: DragSource, pointer: Point) -> Result<()> {
        self.drag.begin(source, pointer)?;
        self.drag_origin = Some(pointer);
        Ok(())
    }

    /// Start dragging a new panel of a registered type into the layout.
    pub fn begin_panel_drag(&mut self, panel_type: &str, pointer: Point) -> Result<()> {
        if !self.registry.contains(panel_type) {
            return Err(DockError::UnknownPanelType(panel_type.to_owned()));
        }
        self.begin_drag(DragSource::NewPanel(panel_type.to_owned()), pointer)?;
        self.update_drag(pointer)
    }

    fn update_drag(&mut self, pointer: Point) -> Result<()> {
        let effect = self.drag.update(pointer);
        if !matches!(
            effect,
            DragEffect::DragStarted { .. } | DragEffect::DragUpdated { .. }
        ) {
            return Ok(());
        }
        let Some(source) = self.drag.source().cloned() else {
            return Ok(());
        };
        match source {
            DragSource::Splitter { node, .. } => self.drag_divider(node, pointer),
            _ => {
                let anchor = self.find_anchor(&source, pointer);
                if anchor != self.ghost {
                    self.ghost = anchor;
                    self.tree.emit(LayoutEvent::GhostPreview { anchor });
                }
                Ok(())
            }
        }
    }

    fn drag_divider(&mut self, node: NodeId, pointer: Point) -> Result<()> {
        let (rect, orientation) = match self.tree.node(node) {
            Some(n) => (
                n.rect(),
                n.kind()
                    .as_splitter()
                    .map(|s| s.orientation())
                    .ok_or(DockError::NotASplitter(node))?,
            ),
            None => return Err(DockError::UnknownNode(node)),
        };
        let bar = self.config().splitter_size;
        let offset = match orientation {
            Orientation::Horizontal => pointer.x - rect.x,
            Orientation::Vertical => pointer.y - rect.y,
        };
        let fraction = fraction_for_extent(orientation.extent(rect), bar, offset - bar / 2.0);
        self.tree.set_splitter_position(node, fraction)?;
        self.dirty = true;
        Ok(())
    }

    fn source_frame(&self, source: &DragSource) -> Option<NodeId> {
        match source {
            DragSource::Frame(frame) => Some(*frame),
            DragSource::Panel(panel) => self.tree.frame_of(*panel),
            DragSource::Splitter { .. } | DragSource::NewPanel(_) => None,
        }
    }

    fn find_anchor(&self, source: &DragSource, pointer: Point) -> Option<Anchor> {
        let source_frame = self.source_frame(source);
        let candidates = self.tree.anchor_candidates();
        let query = AnchorQuery {
            pointer,
            source_frame,
            candidates: &candidates,
            main_region: self.tree.main_region_rect(),
            allow_split: true,
        };
        let mut anchor = self.detector.detect(&query)?;
        if let DragSource::Frame(frame) = source
            && anchor.target == Some(*frame)
        {
            anchor.is_self = true;
        }
        Some(anchor)
    }

    /// Rectangle a floating drop lands at.
    fn float_rect(&self, source: &DragSource, pointer: Point) -> Rect {
        let (dx, dy) = pointer.delta_from(self.drag_origin.unwrap_or(pointer));
        let current = self
            .source_frame(source)
            .and_then(|frame| self.tree.node(frame))
            .map(|node| node.rect())
            .filter(|rect| !rect.is_empty());
        match current {
            Some(rect) => rect.translate(dx, dy),
            None => {
                let size = self.config().floating_size;
                Rect::new(
                    pointer.x - size.width / 2.0,
                    pointer.y - self.config().title_bar_size / 2.0,
                    size.width,
                    size.height,
                )
            }
        }
        .clamp_within(&self.tree.area())
    }

    fn commit_drag(&mut self, pointer: Point) -> Result<()> {
        let effect = self.drag.commit(pointer)?;
        let result = self.finish_drop(effect, pointer);
        self.end_drag();
        result
    }

    fn end_drag(&mut self) {
        self.drag_origin = None;
        if self.ghost.take().is_some() {
            self.tree.emit(LayoutEvent::GhostPreview { anchor: None });
        }
    }

    fn finish_drop(&mut self, effect: DragEffect, pointer: Point) -> Result<()> {
        let DragEffect::Committed {
            source,
            pointer: _,
            dragged,
        } = effect
        else {
            return Ok(());
        };
        if !dragged {
            return match source {
                DragSource::Panel(panel) => self.focus_panel(panel),
                DragSource::Frame(frame) => {
                    let active = self.tree.frame(frame).and_then(|f| f.active_panel());
                    match active {
                        Some(panel) if self.tree.panel(panel).is_some_and(|p| !p.is_placeholder()) => {
                            self.set_focus(Some(panel));
                            Ok(())
                        }
                        _ => Ok(()),
                    }
                }
                DragSource::Splitter { .. } | DragSource::NewPanel(_) => Ok(()),
            };
        }
        if source.is_splitter() {
            self.dirty = true;
            return Ok(());
        }

        let anchor = self.find_anchor(&source, pointer);
        debug!(target: "dockyard.engine", ?source, ?anchor, "drop");
        match anchor {
            Some(anchor) => self.drop_on(&source, anchor),
            None => self.drop_floating(&source, pointer),
        }
    }

    fn drop_on(&mut self, source: &DragSource, anchor: Anchor) -> Result<()> {
        if anchor.is_self {
            if let (DragSource::Panel(panel), Some(frame), Some(to)) =
                (source, anchor.target, anchor.tab_index)
                && let Some(from) = self.tree.frame(frame).and_then(|f| f.position_of(*panel))
            {
                return self.mutate(|tree| tree.move_tab(frame, from, to));
            }
            return Ok(());
        }
        let target = anchor.target.map(DockTarget::Node);
        let options = InsertOptions {
            tab_index: anchor.tab_index,
            activate: true,
            ..InsertOptions::default()
        };
        match source {
            DragSource::Panel(panel) => {
                self.move_panel(*panel, anchor.location, target, options)?;
                self.set_focus(Some(*panel));
            }
            DragSource::Frame(frame) => self.move_frame(*frame, anchor.location, target)?,
            DragSource::NewPanel(panel_type) => {
                self.add_panel(panel_type, anchor.location, target, options)?;
            }
            DragSource::Splitter { .. } => return Ok(()),
        }
        // A tab-band drop restyles the receiving frame once the move landed.
        if let (Some(target), Some(orientation)) = (anchor.target, anchor.tab_orientation)
            && self.tree.frame(target).is_some_and(|f| f.tab_orientation() != orientation)
        {
            self.tree.set_tab_orientation(target, orientation)?;
        }
        Ok(())
    }

    fn drop_floating(&mut self, source: &DragSource, pointer: Point) -> Result<()> {
        let rect = self.float_rect(source, pointer);
        let options = InsertOptions {
            rect: Some(rect),
            activate: true,
            ..InsertOptions::default()
        };
        match source {
            DragSource::Panel(panel) => self
                .move_panel(*panel, DockLocation::Float, None, options)
                .map(|_| ()),
            DragSource::Frame(frame) => self.float_frame(*frame, Some(rect)),
            DragSource::NewPanel(panel_type) => self
                .add_panel(panel_type, DockLocation::Float, None, options)
                .map(|_| ()),
            DragSource::Splitter { .. } => Ok(()),
        }
    }

    /// Abort the active drag, restoring a dragged divider. Returns whether a
    /// drag was active.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(DragEffect::Canceled { source }) = self.drag.cancel() else {
            return false;
        };
        if let DragSource::Splitter { node, start } = source {
            if let Err(err) = self.tree.set_splitter_position(node, start) {
                warn!(target: "dockyard.engine", %err, "could not restore divider");
            }
            self.dirty = true;
        }
        self.end_drag();
        true
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn save(&self) -> LayoutSnapshot {
        self.tree.save()
    }

    /// Replace the layout, abandoning any drag in progress.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) -> Result<RestoreReport> {
        let report = self.tree.restore(snapshot, &self.registry)?;
        self.cancel_drag();
        self.set_focus(None);
        self.dirty = true;
        Ok(report)
    }

    pub fn save_json(&self) -> Result<String> {
        self.save().to_json()
    }

    pub fn restore_json(&mut self, json: &str) -> Result<RestoreReport> {
        let snapshot = LayoutSnapshot::from_json(json)?;
        self.restore(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use dockyard_core::event::PointerEvent;

    use super::*;

    fn engine() -> DockManager {
        let mut engine = DockManager::default();
        for name in ["editor", "console"] {
            engine
                .register(name, PanelTypeOptions::default(), |_| {})
                .expect("register");
        }
        engine.set_area(Rect::from_size(1000.0, 800.0));
        engine
    }

    fn pointer(kind: PointerEventKind, x: f64, y: f64) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(kind, x, y))
    }

    #[test]
    fn limit_is_enforced() {
        let mut engine = engine();
        engine
            .register(
                "solo",
                PanelTypeOptions {
                    limit: Some(1),
                    ..PanelTypeOptions::default()
                },
                |_| {},
            )
            .expect("register");
        engine
            .add_panel("solo", DockLocation::Left, None, InsertOptions::default())
            .expect("first");
        assert!(matches!(
            engine.add_panel("solo", DockLocation::Left, None, InsertOptions::default()),
            Err(DockError::PanelLimitReached { limit: 1, .. })
        ));
    }

    #[test]
    fn persistent_panels_are_reused() {
        let mut engine = engine();
        engine
            .register(
                "outline",
                PanelTypeOptions {
                    persistent: true,
                    ..PanelTypeOptions::default()
                },
                |init| init.title = "Outline".into(),
            )
            .expect("register");
        let first = engine
            .add_panel("outline", DockLocation::Left, None, InsertOptions::default())
            .expect("add");
        engine.remove_panel(first).expect("remove");
        assert_eq!(engine.tree().retained_panel("outline"), Some(first));
        let again = engine
            .add_panel("outline", DockLocation::Right, None, InsertOptions::default())
            .expect("re-add");
        assert_eq!(again, first);
    }

    #[test]
    fn tick_respects_response_rate() {
        let mut engine = engine();
        assert!(engine.tick(Duration::ZERO).expect("tick"));
        engine.set_area(Rect::from_size(900.0, 800.0));
        assert!(!engine.tick(Duration::from_millis(1)).expect("tick"));
        assert!(engine.tick(Duration::from_millis(9)).expect("tick"));
        assert!(!engine.is_dirty());
    }

    #[test]
    fn splitter_drag_and_cancel_restores_divider() {
        let mut engine = engine();
        let editor = engine
            .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        engine
            .add_panel(
                "console",
                DockLocation::Right,
                Some(DockTarget::Panel(editor)),
                InsertOptions {
                    fraction: Some(0.5),
                    ..InsertOptions::default()
                },
            )
            .expect("console");
        engine.solve_now();
        let root = engine.tree().root().expect("root");
        let bar = engine.tree().splitter_bar(root).expect("bar");
        let (x, y) = (bar.x + 1.0, 400.0);

        engine
            .handle_event(pointer(PointerEventKind::Down(PointerButton::Primary), x, y))
            .expect("down");
        engine
            .handle_event(pointer(PointerEventKind::Moved, 251.5, y))
            .expect("move");
        engine.tick(Duration::ZERO).expect("tick");
        let moved = engine.tree().splitter(root).map(|s| s.position()).expect("splitter");
        // Bar centred on the pointer: 250px of the 997px left after the bar.
        assert!((moved - 250.0 / 997.0).abs() < 1e-9);

        engine.handle_event(InputEvent::Cancel).expect("cancel");
        assert_eq!(engine.tree().splitter(root).map(|s| s.position()), Some(0.5));
        assert!(!engine.drag().is_active());
    }

    fn tab_band_anchor(frame: NodeId) -> Anchor {
        Anchor {
            location: DockLocation::Stacked,
            target: Some(frame),
            rect: Rect::from_size(100.0, 24.0),
            tab_orientation: Some(TabOrientation::Left),
            tab_index: Some(0),
            is_self: false,
        }
    }

    #[test]
    fn rejected_tab_band_drop_keeps_the_tab_orientation() {
        let mut engine = engine();
        engine
            .register(
                "solo",
                PanelTypeOptions {
                    limit: Some(1),
                    ..PanelTypeOptions::default()
                },
                |_| {},
            )
            .expect("register");
        let solo = engine
            .add_panel("solo", DockLocation::Left, None, InsertOptions::default())
            .expect("solo");
        let frame = engine.tree().frame_of(solo).expect("frame");
        let before = engine.save();

        let source = DragSource::NewPanel("solo".into());
        assert!(matches!(
            engine.drop_on(&source, tab_band_anchor(frame)),
            Err(DockError::PanelLimitReached { limit: 1, .. })
        ));
        assert_eq!(
            engine.tree().frame(frame).map(|f| f.tab_orientation()),
            Some(TabOrientation::Top)
        );
        assert_eq!(engine.save(), before);

        let source = DragSource::NewPanel("console".into());
        engine
            .drop_on(&source, tab_band_anchor(frame))
            .expect("drop");
        let f = engine.tree().frame(frame).expect("frame");
        assert_eq!(f.panels().len(), 2);
        assert_eq!(f.tab_orientation(), TabOrientation::Left);
    }

    #[test]
    fn a_failing_coalesced_move_does_not_swallow_later_input() {
        let mut engine = engine();
        let editor = engine
            .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        let console = engine
            .add_panel(
                "console",
                DockLocation::Right,
                Some(DockTarget::Panel(editor)),
                InsertOptions::default(),
            )
            .expect("console");
        engine.solve_now();
        let root = engine.tree().root().expect("root");
        let bar = engine.tree().splitter_bar(root).expect("bar");
        let (x, y) = (bar.x + 1.0, 400.0);
        engine
            .handle_event(pointer(PointerEventKind::Down(PointerButton::Primary), x, y))
            .expect("down");
        engine
            .handle_event(pointer(PointerEventKind::Moved, x + 40.0, y))
            .expect("move");
        engine.tick(Duration::ZERO).expect("tick");
        assert!(engine.drag().is_dragging());

        // The divider being dragged goes away with the split.
        engine.remove_panel(console).expect("remove");
        engine
            .handle_event(pointer(PointerEventKind::Moved, x + 80.0, y))
            .expect("coalesced");
        assert_eq!(
            engine.handle_event(InputEvent::Cancel),
            Err(DockError::UnknownNode(root))
        );
        assert!(!engine.drag().is_active(), "cancel still ran");
    }

    #[test]
    fn dropping_a_new_panel_on_an_edge_splits_the_main_region() {
        let mut engine = engine();
        engine
            .add_panel("editor", DockLocation::Left, None, InsertOptions::default())
            .expect("editor");
        engine.solve_now();
        engine
            .begin_panel_drag("console", Point::new(500.0, 790.0))
            .expect("begin");
        assert_eq!(
            engine.ghost().map(|a| a.location),
            Some(DockLocation::Bottom)
        );
        engine
            .handle_event(pointer(PointerEventKind::Up(PointerButton::Primary), 500.0, 790.0))
            .expect("up");
        assert_eq!(engine.tree().count_of_type("console"), 1);
        assert_eq!(engine.ghost(), None);
        assert!(engine
            .drain_events()
            .contains(&LayoutEvent::GhostPreview { anchor: None }));
    }
}
