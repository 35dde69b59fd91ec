//! Drag lifecycle.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle
//!    \------> Idle (commit/cancel from Armed)
//! ```
//!
//! The machine only tracks where the pointer went; the engine decides what a
//! step means for the tree. A drag is armed on pointer down and starts once
//! the pointer has travelled `threshold` pixels from its origin. Panel
//! creation drags skip arming: the host starts them from outside the layout.

use dockyard_core::geometry::Point;
use tracing::debug;

use crate::error::{DockError, Result};
use crate::node::{NodeId, PanelId};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A splitter divider; `start` is the divider fraction to restore on
    /// cancel.
    Splitter { node: NodeId, start: f64 },
    /// A whole frame, by its title band.
    Frame(NodeId),
    /// One tab of a multi-tab frame.
    Panel(PanelId),
    /// A panel of a registered type that does not exist yet.
    NewPanel(String),
}

impl DragSource {
    /// Frame the drag originates from, when it has one.
    #[must_use]
    pub fn frame(&self) -> Option<NodeId> {
        match self {
            Self::Frame(frame) => Some(*frame),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_splitter(&self) -> bool {
        matches!(self, Self::Splitter { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Armed {
        source: DragSource,
        origin: Point,
        current: Point,
    },
    Dragging {
        source: DragSource,
        origin: Point,
        current: Point,
    },
}

/// Why a step was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ThresholdNotReached,
}

/// Result of one lifecycle step.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    Armed,
    DragStarted { pointer: Point },
    DragUpdated { pointer: Point },
    /// Pointer released. `dragged` is false when the threshold was never
    /// crossed (a click).
    Committed {
        source: DragSource,
        pointer: Point,
        dragged: bool,
    },
    Canceled { source: DragSource },
    Noop { reason: DragNoopReason },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragMachine {
    state: DragState,
    threshold: f64,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl DragMachine {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            state: DragState::Idle,
            threshold: threshold.max(0.0),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold.max(0.0);
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Whether the threshold has been crossed.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    #[must_use]
    pub fn source(&self) -> Option<&DragSource> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed { source, .. } | DragState::Dragging { source, .. } => Some(source),
        }
    }

    /// Latest pointer position of the active drag.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed { current, .. } | DragState::Dragging { current, .. } => {
                Some(*current)
            }
        }
    }

    /// Arm a drag at `origin`. New-panel drags start immediately.
    pub fn begin(&mut self, source: DragSource, origin: Point) -> Result<DragEffect> {
        if self.is_active() {
            return Err(DockError::DragInProgress);
        }
        debug!(target: "dockyard.drag", ?source, x = origin.x, y = origin.y, "drag armed");
        if matches!(source, DragSource::NewPanel(_)) {
            self.state = DragState::Dragging {
                source,
                origin,
                current: origin,
            };
            return Ok(DragEffect::DragStarted { pointer: origin });
        }
        self.state = DragState::Armed {
            source,
            origin,
            current: origin,
        };
        Ok(DragEffect::Armed)
    }

    /// Feed a pointer move.
    pub fn update(&mut self, pointer: Point) -> DragEffect {
        match &mut self.state {
            DragState::Idle => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            DragState::Armed {
                source,
                origin,
                current,
            } => {
                *current = pointer;
                if pointer.distance(*origin) < self.threshold {
                    return DragEffect::Noop {
                        reason: DragNoopReason::ThresholdNotReached,
                    };
                }
                debug!(target: "dockyard.drag", ?source, "drag started");
                self.state = DragState::Dragging {
                    source: source.clone(),
                    origin: *origin,
                    current: pointer,
                };
                DragEffect::DragStarted { pointer }
            }
            DragState::Dragging { current, .. } => {
                *current = pointer;
                DragEffect::DragUpdated { pointer }
            }
        }
    }

    /// Release the pointer, ending the drag.
    pub fn commit(&mut self, pointer: Point) -> Result<DragEffect> {
        let (source, dragged) = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return Err(DockError::NoActiveDrag),
            DragState::Armed { source, .. } => (source, false),
            DragState::Dragging { source, .. } => (source, true),
        };
        debug!(target: "dockyard.drag", ?source, dragged, "drag committed");
        Ok(DragEffect::Committed {
            source,
            pointer,
            dragged,
        })
    }

    /// Abort the drag; `None` when nothing was active.
    pub fn cancel(&mut self) -> Option<DragEffect> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Armed { source, .. } | DragState::Dragging { source, .. } => {
                debug!(target: "dockyard.drag", ?source, "drag canceled");
                Some(DragEffect::Canceled { source })
            }
        }
    }
}
