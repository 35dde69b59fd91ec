//! Frames: tabbed containers of panels.
//!
//! A frame walks `Empty -> SingleTab <-> MultiTab -> Empty`. Empty frames
//! never survive a tree mutation; the rebalance sweep removes them.

use dockyard_core::geometry::{Point, Rect, SizeBox};

use crate::node::{NodeBehavior, NodeId, Orientation, PanelId, TabOrientation};
use crate::tree::DockTree;

/// Tab count state of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Empty,
    SingleTab,
    MultiTab,
}

/// Visibility change produced by switching tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSwitch {
    pub index: usize,
    pub hidden: Option<PanelId>,
    pub shown: PanelId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub(crate) panels: Vec<PanelId>,
    pub(crate) active: Option<usize>,
    pub(crate) tab_orientation: TabOrientation,
    pub(crate) floating: bool,
    pub(crate) modal: bool,
    pub(crate) show_title: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            panels: Vec::new(),
            active: None,
            tab_orientation: TabOrientation::Top,
            floating: false,
            modal: false,
            show_title: true,
        }
    }

    #[must_use]
    pub fn floating(modal: bool) -> Self {
        Self {
            floating: true,
            modal,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    #[must_use]
    pub const fn active(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active_panel(&self) -> Option<PanelId> {
        self.active.and_then(|index| self.panels.get(index).copied())
    }

    #[must_use]
    pub const fn tab_orientation(&self) -> TabOrientation {
        self.tab_orientation
    }

    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.floating
    }

    #[must_use]
    pub const fn is_modal(&self) -> bool {
        self.modal
    }

    #[must_use]
    pub const fn shows_title(&self) -> bool {
        self.show_title
    }

    #[must_use]
    pub fn state(&self) -> FrameState {
        match self.panels.len() {
            0 => FrameState::Empty,
            1 => FrameState::SingleTab,
            _ => FrameState::MultiTab,
        }
    }

    #[must_use]
    pub fn position_of(&self, panel: PanelId) -> Option<usize> {
        self.panels.iter().position(|p| *p == panel)
    }

    /// Insert a panel at `index` (clamped; default append).
    ///
    /// The panel becomes active only when the frame was empty. Returns the
    /// index it landed at.
    pub fn add_panel(&mut self, panel: PanelId, index: Option<usize>) -> usize {
        let at = index.map_or(self.panels.len(), |i| i.min(self.panels.len()));
        self.panels.insert(at, panel);
        match self.active {
            None if self.panels.len() == 1 => self.active = Some(0),
            Some(active) if at <= active => self.active = Some(active + 1),
            _ => {}
        }
        at
    }

    /// Remove a panel; returns whether any panels remain.
    ///
    /// Removing the active panel selects the previous index (clamped to 0);
    /// removing a panel in front of the active one keeps the same panel
    /// active.
    pub fn remove_panel(&mut self, panel: PanelId) -> bool {
        let Some(at) = self.position_of(panel) else {
            return !self.panels.is_empty();
        };
        self.panels.remove(at);
        if self.panels.is_empty() {
            self.active = None;
            return false;
        }
        if let Some(active) = self.active {
            let next = if at < active {
                active - 1
            } else if at == active {
                active.saturating_sub(1)
            } else {
                active
            };
            self.active = Some(next.min(self.panels.len() - 1));
        }
        true
    }

    /// Switch the active tab. Out-of-range indices and re-selecting the
    /// current tab are no-ops.
    pub fn set_active_tab(&mut self, index: usize) -> Option<TabSwitch> {
        let shown = *self.panels.get(index)?;
        if self.active == Some(index) {
            return None;
        }
        let hidden = self.active_panel();
        self.active = Some(index);
        Some(TabSwitch {
            index,
            hidden,
            shown,
        })
    }

    /// Reorder a tab, keeping the active panel active.
    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from >= self.panels.len() || to >= self.panels.len() {
            return false;
        }
        if from == to {
            return true;
        }
        let active_panel = self.active_panel();
        let panel = self.panels.remove(from);
        self.panels.insert(to, panel);
        if let Some(active_panel) = active_panel {
            self.active = self.position_of(active_panel);
        }
        true
    }

    /// Tab insertion index for a pointer inside a title band.
    #[must_use]
    pub fn tab_index_at(&self, band: Rect, orientation: TabOrientation, pointer: Point) -> usize {
        insertion_slot(band, orientation, pointer, self.panels.len())
    }

    /// Index of the tab under the pointer.
    #[must_use]
    pub fn tab_under(&self, band: Rect, orientation: TabOrientation, pointer: Point) -> usize {
        tab_at(band, orientation, pointer, self.panels.len())
    }

    /// Title-bar thickness for the given configured size.
    #[must_use]
    pub fn title_thickness(&self, configured: f64) -> f64 {
        if self.show_title { configured } else { 0.0 }
    }

    fn add_title(&self, size: SizeBox, thickness: f64) -> SizeBox {
        match self.tab_orientation.consumed_axis() {
            Orientation::Vertical => SizeBox::new(size.width, size.height + thickness),
            Orientation::Horizontal => SizeBox::new(size.width + thickness, size.height),
        }
    }
}

/// Offset of the pointer along a title band and the band's length.
fn along_band(band: Rect, orientation: TabOrientation, pointer: Point) -> (f64, f64) {
    match orientation {
        TabOrientation::Top | TabOrientation::Bottom => (pointer.x - band.x, band.width),
        TabOrientation::Left | TabOrientation::Right => (pointer.y - band.y, band.height),
    }
}

/// Gap between tabs nearest to the pointer, `0..=count`. Tabs share the
/// band evenly.
pub(crate) fn insertion_slot(
    band: Rect,
    orientation: TabOrientation,
    pointer: Point,
    count: usize,
) -> usize {
    let (offset, extent) = along_band(band, orientation, pointer);
    if count == 0 || extent <= 0.0 {
        return count;
    }
    let slot = (offset / extent * count as f64).clamp(0.0, count as f64);
    (slot.round() as usize).min(count)
}

/// Tab under the pointer, `0..count`.
pub(crate) fn tab_at(band: Rect, orientation: TabOrientation, pointer: Point, count: usize) -> usize {
    let (offset, extent) = along_band(band, orientation, pointer);
    let count = count.max(1);
    if extent <= 0.0 {
        return 0;
    }
    ((offset / extent * count as f64).floor().max(0.0) as usize).min(count - 1)
}

impl NodeBehavior for Frame {
    /// Largest panel minimum plus the title bar.
    fn min_size(&self, tree: &DockTree) -> SizeBox {
        let content = self
            .panels
            .iter()
            .filter_map(|id| tree.panel(*id))
            .fold(SizeBox::ZERO, |acc, panel| acc.max(panel.min_size()));
        self.add_title(content, self.title_thickness(tree.config().title_bar_size))
    }

    /// Smallest panel maximum (never below the minimum) plus the title bar.
    fn max_size(&self, tree: &DockTree) -> SizeBox {
        let mut content = SizeBox::UNBOUNDED;
        let mut floor = SizeBox::ZERO;
        for panel in self.panels.iter().filter_map(|id| tree.panel(*id)) {
            content = content.min(panel.max_size());
            floor = floor.max(panel.min_size());
        }
        self.add_title(
            content.max(floor),
            self.title_thickness(tree.config().title_bar_size),
        )
    }

    fn child_nodes(&self) -> Vec<NodeId> {
        Vec::new()
    }
}
