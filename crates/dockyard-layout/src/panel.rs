//! Panels: the content units that frames arrange into tabs.

use bitflags::bitflags;
use dockyard_core::geometry::{Point, SizeBox};
use serde_json::Value;

use crate::node::{NodeId, PanelId};

/// Reserved type name of the placeholder panel.
pub const PLACEHOLDER_TYPE: &str = "__placeholder__";

bitflags! {
    /// Behaviour switches of a panel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PanelFlags: u8 {
        /// Can be dragged and redocked by the user.
        const MOVEABLE    = 0b0000_0001;
        /// Shows a close affordance and may be removed by the user.
        const CLOSEABLE   = 0b0000_0010;
        /// May be moved into an edge drawer.
        const COLLAPSIBLE = 0b0000_0100;
        const SCROLL_X    = 0b0000_1000;
        const SCROLL_Y    = 0b0001_0000;
    }
}

impl PanelFlags {
    /// Flags given to panels whose type does not override them.
    pub const STANDARD: Self = Self::MOVEABLE
        .union(Self::CLOSEABLE)
        .union(Self::COLLAPSIBLE);
}

impl Default for PanelFlags {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Initial state a panel factory fills in before the panel is created.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelInit {
    pub title: String,
    pub desired_size: SizeBox,
    pub min_size: SizeBox,
    pub max_size: SizeBox,
    pub flags: PanelFlags,
    pub payload: Value,
}

impl Default for PanelInit {
    fn default() -> Self {
        Self {
            title: String::new(),
            desired_size: SizeBox::new(200.0, 200.0),
            min_size: SizeBox::ZERO,
            max_size: SizeBox::UNBOUNDED,
            flags: PanelFlags::STANDARD,
            payload: Value::Null,
        }
    }
}

impl PanelInit {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_desired(mut self, width: f64, height: f64) -> Self {
        self.desired_size = SizeBox::new(width, height);
        self
    }

    #[must_use]
    pub fn with_min(mut self, width: f64, height: f64) -> Self {
        self.min_size = SizeBox::new(width, height);
        self
    }

    #[must_use]
    pub fn with_max(mut self, width: f64, height: f64) -> Self {
        self.max_size = SizeBox::new(width, height);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: PanelFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A content unit hosted by exactly one frame at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub(crate) id: PanelId,
    pub(crate) panel_type: String,
    pub title: String,
    pub desired_size: SizeBox,
    pub(crate) min_size: SizeBox,
    pub(crate) max_size: SizeBox,
    pub flags: PanelFlags,
    /// Owning frame; `None` while detached or retained.
    pub(crate) frame: Option<NodeId>,
    pub(crate) visible: bool,
    pub scroll: Point,
    pub(crate) persistent: bool,
    pub payload: Value,
    /// Content size from the last solve, used as a hint when moving.
    pub(crate) last_size: Option<SizeBox>,
}

impl Panel {
    pub(crate) fn from_init(
        id: PanelId,
        panel_type: impl Into<String>,
        init: PanelInit,
        persistent: bool,
    ) -> Self {
        let mut panel = Self {
            id,
            panel_type: panel_type.into(),
            title: init.title,
            desired_size: init.desired_size,
            min_size: SizeBox::ZERO,
            max_size: SizeBox::UNBOUNDED,
            flags: init.flags,
            frame: None,
            visible: false,
            scroll: Point::default(),
            persistent,
            payload: init.payload,
            last_size: None,
        };
        panel.set_size_limits(init.min_size, init.max_size);
        panel
    }

    pub(crate) fn placeholder(id: PanelId) -> Self {
        Self::from_init(
            id,
            PLACEHOLDER_TYPE,
            PanelInit::default().with_flags(PanelFlags::empty()),
            false,
        )
    }

    #[must_use]
    pub const fn id(&self) -> PanelId {
        self.id
    }

    #[must_use]
    pub fn panel_type(&self) -> &str {
        &self.panel_type
    }

    #[must_use]
    pub const fn frame(&self) -> Option<NodeId> {
        self.frame
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.persistent
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.panel_type == PLACEHOLDER_TYPE
    }

    #[must_use]
    pub fn is_moveable(&self) -> bool {
        self.flags.contains(PanelFlags::MOVEABLE)
    }

    #[must_use]
    pub const fn min_size(&self) -> SizeBox {
        self.min_size
    }

    #[must_use]
    pub const fn max_size(&self) -> SizeBox {
        self.max_size
    }

    #[must_use]
    pub const fn last_size(&self) -> Option<SizeBox> {
        self.last_size
    }

    /// Set both limits. Negative or NaN minimums become zero and the maximum
    /// is raised to the minimum where they cross.
    pub fn set_size_limits(&mut self, min: SizeBox, max: SizeBox) {
        let sanitize = |v: f64| if v.is_nan() || v < 0.0 { 0.0 } else { v };
        let min = SizeBox::new(sanitize(min.width), sanitize(min.height));
        let max = SizeBox::new(
            if max.width.is_nan() { f64::INFINITY } else { max.width },
            if max.height.is_nan() { f64::INFINITY } else { max.height },
        );
        self.min_size = min;
        self.max_size = max.max(min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> PanelId {
        PanelId::new(raw).expect("non-zero")
    }

    #[test]
    fn standard_flags_allow_docking_gestures() {
        let panel = Panel::from_init(id(1), "editor", PanelInit::titled("Editor"), false);
        assert!(panel.is_moveable());
        assert!(panel.flags.contains(PanelFlags::CLOSEABLE));
        assert!(!panel.flags.contains(PanelFlags::SCROLL_X));
        assert!(panel.frame().is_none());
    }

    #[test]
    fn placeholder_cannot_move_or_close() {
        let panel = Panel::placeholder(id(3));
        assert!(panel.is_placeholder());
        assert!(!panel.is_moveable());
        assert!(!panel.flags.contains(PanelFlags::CLOSEABLE));
    }

    #[test]
    fn crossed_limits_raise_the_maximum() {
        let init = PanelInit::default()
            .with_min(100.0, -5.0)
            .with_max(50.0, f64::NAN);
        let panel = Panel::from_init(id(2), "tool", init, false);
        assert_eq!(panel.min_size(), SizeBox::new(100.0, 0.0));
        assert_eq!(panel.max_size(), SizeBox::new(100.0, f64::INFINITY));
    }
}
