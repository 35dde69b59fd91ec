#![forbid(unsafe_code)]

//! Coalescing for high-frequency input events.
//!
//! Dragging a frame or a splitter produces a flood of pointer moves, and an
//! interactive window resize produces a flood of size ticks. Each of them
//! would otherwise trigger an anchor search or a full re-layout.
//!
//! [`InputCoalescer`] keeps only the latest pointer move and the latest resize
//! tick. Everything else (pointer down/up, resize start/end, cancel) passes
//! through immediately; the caller flushes pending events first so ordering
//! is preserved.
//!
//! # Usage
//!
//! ```
//! use dockyard_core::event::{InputEvent, PointerEvent, PointerEventKind, PointerButton};
//! use dockyard_core::event_coalescer::InputCoalescer;
//!
//! let mut coalescer = InputCoalescer::new();
//! let moved = |x| InputEvent::Pointer(PointerEvent::new(PointerEventKind::Moved, x, 0.0));
//!
//! assert!(coalescer.push(moved(10.0)).is_none());
//! assert!(coalescer.push(moved(20.0)).is_none());
//!
//! let up = InputEvent::Pointer(PointerEvent::new(
//!     PointerEventKind::Up(PointerButton::Primary),
//!     20.0,
//!     0.0,
//! ));
//! assert!(coalescer.push(up).is_some());
//!
//! let pending = coalescer.flush();
//! assert_eq!(pending.len(), 1);
//! ```

use crate::event::{InputEvent, PointerEvent, PointerEventKind, ResizeEvent};

/// Coalesces pointer moves and resize ticks.
///
/// Not thread-safe; owned by the single event-processing thread. Holds at
/// most two pending events.
#[derive(Debug, Clone, Default)]
pub struct InputCoalescer {
    /// Latest pointer move.
    pending_move: Option<PointerEvent>,

    /// Latest resize tick, plus how many ticks were folded into it.
    pending_resize: Option<(ResizeEvent, u32)>,
}

impl InputCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the coalescer.
    ///
    /// Returns `Some(event)` if the event should be processed immediately, or
    /// `None` if it was folded into a pending event.
    pub fn push(&mut self, event: InputEvent) -> Option<InputEvent> {
        match event {
            InputEvent::Pointer(pointer) if pointer.kind == PointerEventKind::Moved => {
                self.pending_move = Some(pointer);
                None
            }
            InputEvent::Resize(tick @ ResizeEvent::Tick { .. }) => {
                let folded = self.pending_resize.map_or(0, |(_, count)| count);
                self.pending_resize = Some((tick, folded.saturating_add(1)));
                None
            }
            other => Some(other),
        }
    }

    /// Flush all pending events: resize first (it changes geometry the pointer
    /// is interpreted against), then the pointer move.
    #[must_use]
    pub fn flush(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.flush_each(|event| events.push(event));
        events
    }

    /// Flush pending events, calling a closure for each.
    pub fn flush_each<F>(&mut self, mut f: F)
    where
        F: FnMut(InputEvent),
    {
        if let Some((resize, _)) = self.pending_resize.take() {
            f(InputEvent::Resize(resize));
        }
        if let Some(pointer) = self.pending_move.take() {
            f(InputEvent::Pointer(pointer));
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_move.is_some() || self.pending_resize.is_some()
    }

    /// Number of resize ticks folded into the pending one (0 if none).
    #[must_use]
    pub fn pending_resize_count(&self) -> u32 {
        self.pending_resize.map_or(0, |(_, count)| count)
    }

    /// Drop pending events without processing them.
    pub fn clear(&mut self) {
        self.pending_move = None;
        self.pending_resize = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Modifiers, PointerButton};

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(PointerEventKind::Moved, x, y))
    }

    fn tick(width: f64, height: f64) -> InputEvent {
        InputEvent::Resize(ResizeEvent::Tick { width, height })
    }

    #[test]
    fn new_coalescer_has_no_pending() {
        let coalescer = InputCoalescer::new();
        assert!(!coalescer.has_pending());
        assert_eq!(coalescer.pending_resize_count(), 0);
    }

    #[test]
    fn pointer_moves_keep_latest_position() {
        let mut coalescer = InputCoalescer::new();
        assert!(coalescer.push(moved(10.0, 10.0)).is_none());
        assert!(coalescer.push(moved(20.0, 25.0)).is_none());

        let pending = coalescer.flush();
        assert_eq!(pending, vec![moved(20.0, 25.0)]);
        assert!(!coalescer.has_pending());
    }

    #[test]
    fn pointer_move_preserves_modifiers() {
        let mut coalescer = InputCoalescer::new();
        let event = PointerEvent::new(PointerEventKind::Moved, 5.0, 5.0)
            .with_modifiers(Modifiers::ALT);
        let _ = coalescer.push(InputEvent::Pointer(event));

        let pending = coalescer.flush();
        let InputEvent::Pointer(pointer) = pending[0] else {
            panic!("expected pointer event");
        };
        assert_eq!(pointer.modifiers, Modifiers::ALT);
    }

    #[test]
    fn resize_ticks_coalesce_and_count() {
        let mut coalescer = InputCoalescer::new();
        let _ = coalescer.push(tick(100.0, 100.0));
        let _ = coalescer.push(tick(120.0, 90.0));
        let _ = coalescer.push(tick(140.0, 80.0));
        assert_eq!(coalescer.pending_resize_count(), 3);

        assert_eq!(coalescer.flush(), vec![tick(140.0, 80.0)]);
    }

    #[test]
    fn discrete_events_pass_through() {
        let mut coalescer = InputCoalescer::new();
        let down = InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Down(PointerButton::Primary),
            1.0,
            1.0,
        ));
        assert_eq!(coalescer.push(down), Some(down));
        assert_eq!(coalescer.push(InputEvent::Cancel), Some(InputEvent::Cancel));
        let end = InputEvent::Resize(ResizeEvent::End {
            width: 10.0,
            height: 10.0,
        });
        assert_eq!(coalescer.push(end), Some(end));
        assert!(!coalescer.has_pending());
    }

    #[test]
    fn flush_orders_resize_before_pointer() {
        let mut coalescer = InputCoalescer::new();
        let _ = coalescer.push(moved(1.0, 2.0));
        let _ = coalescer.push(tick(50.0, 60.0));
        assert_eq!(coalescer.flush(), vec![tick(50.0, 60.0), moved(1.0, 2.0)]);
    }

    #[test]
    fn clear_discards_pending() {
        let mut coalescer = InputCoalescer::new();
        let _ = coalescer.push(moved(1.0, 2.0));
        coalescer.clear();
        assert!(coalescer.flush().is_empty());
    }
}
