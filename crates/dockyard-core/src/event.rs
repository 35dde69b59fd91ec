#![forbid(unsafe_code)]

//! Canonical input event types consumed by the docking engine.
//!
//! The host captures raw pointer/touch/window events and normalizes them into
//! these types before handing them to the engine.
//!
//! # Design Notes
//!
//! - Pointer coordinates are host pixels relative to the dock container.
//! - `Modifiers` use bitflags for easy combination.
//! - `Cancel` is the discrete abort signal (typically bound to Escape).

use bitflags::bitflags;

use crate::geometry::Point;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A pointer event.
    Pointer(PointerEvent),

    /// Container resize notification.
    Resize(ResizeEvent),

    /// Abort whatever interaction is in progress.
    Cancel,
}

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Pointer position.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down(PointerButton),
    Up(PointerButton),
    Moved,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Container resize lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeEvent {
    /// The host started an interactive resize.
    Start,
    /// Intermediate size during a resize.
    Tick { width: f64, height: f64 },
    /// Final size.
    End { width: f64, height: f64 },
}
