#![forbid(unsafe_code)]

//! Core: geometry, size boxes, and normalized input for Dockyard.
//!
//! # Role in Dockyard
//! `dockyard-core` is the input and value layer. It owns the pixel geometry
//! types shared by every container, the sentinel codec that lets unbounded
//! sizes round-trip through JSON, and the normalized pointer/resize events the
//! host feeds into the engine.
//!
//! # How it fits in the system
//! `dockyard-layout` consumes these types. The host captures raw input,
//! converts it to [`event::InputEvent`], optionally coalesces it with
//! [`event_coalescer::InputCoalescer`], and hands it to the engine.

pub mod event;
pub mod event_coalescer;
pub mod geometry;
pub mod sentinel;

pub use geometry::{Point, Rect, Sides, SizeBox};
