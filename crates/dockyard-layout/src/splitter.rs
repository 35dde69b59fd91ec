//! Splitters: two-slot containers with a fractional divider.
//!
//! The stored divider position is the user's intent. The solver clamps it
//! into the feasible interval every time it lays the splitter out but never
//! writes the clamped value back, so a temporary shrink followed by a grow
//! restores the original proportions.

use dockyard_core::geometry::{Rect, SizeBox};

use crate::node::{DockEdge, NodeBehavior, NodeId, Orientation};
use crate::tree::DockTree;

/// Distance from the target at which a divider animation snaps.
pub const DIVIDER_EPSILON: f64 = 1e-3;

/// Which of the two slots a child occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

/// Result of one animation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Continuing,
    Done,
}

/// Linear divider slide toward a target fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerAnimation {
    target: f64,
    step: f64,
}

impl DividerAnimation {
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Splitter {
    pub(crate) first: Option<NodeId>,
    pub(crate) second: Option<NodeId>,
    pub(crate) orientation: Orientation,
    pub(crate) position: f64,
    pub(crate) animation: Option<DividerAnimation>,
    /// Set on the splitter wrapping an edge drawer.
    pub(crate) drawer: Option<DockEdge>,
}

impl Splitter {
    #[must_use]
    pub fn new(orientation: Orientation, position: f64) -> Self {
        Self {
            first: None,
            second: None,
            orientation,
            position: sanitize_fraction(position),
            animation: None,
            drawer: None,
        }
    }

    #[must_use]
    pub const fn first(&self) -> Option<NodeId> {
        self.first
    }

    #[must_use]
    pub const fn second(&self) -> Option<NodeId> {
        self.second
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Stored divider fraction.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub const fn drawer(&self) -> Option<DockEdge> {
        self.drawer
    }

    #[must_use]
    pub const fn animation(&self) -> Option<DividerAnimation> {
        self.animation
    }

    #[must_use]
    pub fn child(&self, slot: Slot) -> Option<NodeId> {
        match slot {
            Slot::First => self.first,
            Slot::Second => self.second,
        }
    }

    pub(crate) fn set_child(&mut self, slot: Slot, child: Option<NodeId>) {
        match slot {
            Slot::First => self.first = child,
            Slot::Second => self.second = child,
        }
    }

    #[must_use]
    pub fn slot_of(&self, child: NodeId) -> Option<Slot> {
        if self.first == Some(child) {
            Some(Slot::First)
        } else if self.second == Some(child) {
            Some(Slot::Second)
        } else {
            None
        }
    }

    /// Swap `old` for `new` in whichever slot holds it.
    pub(crate) fn replace_child(&mut self, old: NodeId, new: Option<NodeId>) -> bool {
        match self.slot_of(old) {
            Some(slot) => {
                self.set_child(slot, new);
                true
            }
            None => false,
        }
    }

    /// Set the divider, clamped into `[0, 1]`. Cancels any running animation.
    pub fn set_position(&mut self, fraction: f64) {
        self.position = sanitize_fraction(fraction);
        self.animation = None;
    }

    /// Start a linear slide toward `target` over `steps` ticks.
    ///
    /// Zero steps, or a target already within [`DIVIDER_EPSILON`], jumps
    /// straight to the target.
    pub fn animate_position(&mut self, target: f64, steps: u32) {
        let target = sanitize_fraction(target);
        if steps == 0 || (target - self.position).abs() <= DIVIDER_EPSILON {
            self.set_position(target);
            return;
        }
        self.animation = Some(DividerAnimation {
            target,
            step: (target - self.position) / f64::from(steps),
        });
    }

    /// Advance a running animation by one tick.
    pub fn advance(&mut self) -> AnimationStatus {
        let Some(animation) = self.animation else {
            return AnimationStatus::Done;
        };
        let next = self.position + animation.step;
        let overshoot = (animation.target - next) * animation.step.signum() <= 0.0;
        if overshoot || (animation.target - next).abs() <= DIVIDER_EPSILON {
            self.position = animation.target;
            self.animation = None;
            AnimationStatus::Done
        } else {
            self.position = next;
            AnimationStatus::Continuing
        }
    }

    /// Divider bar thickness: drawer splitters have none.
    #[must_use]
    pub fn bar_size(&self, configured: f64) -> f64 {
        if self.drawer.is_some() { 0.0 } else { configured.max(0.0) }
    }
}

fn sanitize_fraction(value: f64) -> f64 {
    if value.is_nan() { 0.5 } else { value.clamp(0.0, 1.0) }
}

/// Minimum and maximum size of one splitter side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideBounds {
    pub min: SizeBox,
    pub max: SizeBox,
}

impl SideBounds {
    /// An empty slot: no lower bound and no upper bound.
    pub const OPEN: Self = Self {
        min: SizeBox::ZERO,
        max: SizeBox::UNBOUNDED,
    };
}

/// Output of [`resolve_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitResolution {
    pub first: Rect,
    pub second: Rect,
    pub bar: Rect,
    /// Fraction actually used after clamping.
    pub position: f64,
    /// The container could not cover both minimums.
    pub overflow: bool,
}

/// Clamp `position` so that each side's pixel extent lies in its bounds and
/// lay the two sides out inside `container`.
///
/// When the minimums do not fit, space is shared in proportion to them and
/// `overflow` is set. When the maximums cannot fill the container, the first
/// side takes its maximum and the second side stretches.
#[must_use]
pub fn resolve_position(
    orientation: Orientation,
    container: Rect,
    position: f64,
    first: SideBounds,
    second: SideBounds,
    bar: f64,
) -> SplitResolution {
    let extent = orientation.extent(container).max(0.0);
    let bar = bar.clamp(0.0, extent);
    let available = extent - bar;
    let position = sanitize_fraction(position);

    let (min1, max1) = (
        orientation.primary(first.min),
        orientation.primary(first.max),
    );
    let (min2, max2) = (
        orientation.primary(second.min),
        orientation.primary(second.max),
    );

    let mut overflow = false;
    let first_extent = if min1 + min2 > available {
        overflow = true;
        let total = min1 + min2;
        if total > 0.0 {
            available * (min1 / total)
        } else {
            available * position
        }
    } else {
        let lo = min1.max(available - max2);
        let hi = max1.min(available - min2);
        if lo > hi {
            max1.max(min1).min(available - min2)
        } else {
            (available * position).clamp(lo, hi)
        }
    };
    let second_extent = (available - first_extent).max(0.0);
    let effective = if available > 0.0 {
        first_extent / available
    } else {
        position
    };

    let (first_rect, bar_rect, second_rect) = match orientation {
        Orientation::Horizontal => (
            Rect::new(container.x, container.y, first_extent, container.height),
            Rect::new(container.x + first_extent, container.y, bar, container.height),
            Rect::new(
                container.x + first_extent + bar,
                container.y,
                second_extent,
                container.height,
            ),
        ),
        Orientation::Vertical => (
            Rect::new(container.x, container.y, container.width, first_extent),
            Rect::new(container.x, container.y + first_extent, container.width, bar),
            Rect::new(
                container.x,
                container.y + first_extent + bar,
                container.width,
                second_extent,
            ),
        ),
    };

    SplitResolution {
        first: first_rect,
        second: second_rect,
        bar: bar_rect,
        position: effective,
        overflow,
    }
}

/// Divider fraction that gives the first side `first_extent` pixels of the
/// container.
#[must_use]
pub fn fraction_for_extent(container_extent: f64, bar: f64, first_extent: f64) -> f64 {
    let available = container_extent - bar;
    if available <= 0.0 {
        return 0.5;
    }
    sanitize_fraction(first_extent / available)
}

/// Pick a divider fraction from both sides' desired extents.
///
/// Space is shared in proportion to the desired extents, so when both fit
/// each side gets at least what it asked for. The result is clamped into the
/// feasible interval implied by the `(min, max)` bounds. Falls back to 0.5
/// when neither side states a preference.
#[must_use]
pub fn best_position(
    available: f64,
    first_desired: f64,
    second_desired: f64,
    first: (f64, f64),
    second: (f64, f64),
) -> f64 {
    if available <= 0.0 {
        return 0.5;
    }
    let want_first = first_desired.max(0.0);
    let total = want_first + second_desired.max(0.0);
    let mut first_extent = if total > 0.0 {
        available * want_first / total
    } else {
        available * 0.5
    };
    let lo = first.0.max(available - second.1);
    let hi = first.1.min(available - second.0);
    if lo <= hi {
        first_extent = first_extent.clamp(lo, hi);
    }
    sanitize_fraction(first_extent / available)
}

impl NodeBehavior for Splitter {
    fn min_size(&self, tree: &DockTree) -> SizeBox {
        let bar = self.bar_size(tree.config().splitter_size);
        let mins: Vec<SizeBox> = self
            .child_nodes()
            .into_iter()
            .filter_map(|id| tree.node(id))
            .map(|node| node.min_size(tree))
            .collect();
        let primary = mins.iter().map(|s| self.orientation.primary(*s)).sum::<f64>() + bar;
        let cross = mins
            .iter()
            .map(|s| self.orientation.cross(*s))
            .fold(0.0, f64::max);
        self.orientation.compose(primary, cross)
    }

    fn max_size(&self, tree: &DockTree) -> SizeBox {
        let bar = self.bar_size(tree.config().splitter_size);
        let slots = [self.first, self.second];
        let mut primary = bar;
        let mut cross = f64::INFINITY;
        for slot in slots {
            match slot.and_then(|id| tree.node(id)) {
                Some(node) => {
                    let max = node.max_size(tree);
                    primary += self.orientation.primary(max);
                    cross = cross.min(self.orientation.cross(max));
                }
                None => primary = f64::INFINITY,
            }
        }
        let min = self.min_size(tree);
        self.orientation.compose(
            primary.max(self.orientation.primary(min)),
            cross.max(self.orientation.cross(min)),
        )
    }

    fn child_nodes(&self) -> Vec<NodeId> {
        [self.first, self.second].into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(min: f64, max: f64) -> SideBounds {
        SideBounds {
            min: SizeBox::new(min, 0.0),
            max: SizeBox::new(max, f64::INFINITY),
        }
    }

    #[test]
    fn feasible_position_is_kept() {
        let res = resolve_position(
            Orientation::Horizontal,
            Rect::from_size(203.0, 100.0),
            0.25,
            SideBounds::OPEN,
            SideBounds::OPEN,
            3.0,
        );
        assert_eq!(res.first.width, 50.0);
        assert_eq!(res.bar, Rect::new(50.0, 0.0, 3.0, 100.0));
        assert_eq!(res.second, Rect::new(53.0, 0.0, 150.0, 100.0));
        assert!(!res.overflow);
        assert!((res.position - 0.25).abs() < 1e-12);
    }

    #[test]
    fn position_is_clamped_by_mins() {
        let res = resolve_position(
            Orientation::Vertical,
            Rect::from_size(100.0, 100.0),
            0.05,
            bounds(30.0, f64::INFINITY),
            bounds(20.0, f64::INFINITY),
            0.0,
        );
        assert_eq!(res.first.height, 30.0);
        assert_eq!(res.second.height, 70.0);
        assert_eq!(res.second.y, 30.0);
    }

    #[test]
    fn infeasible_mins_share_proportionally() {
        let res = resolve_position(
            Orientation::Horizontal,
            Rect::from_size(100.0, 10.0),
            0.5,
            bounds(150.0, f64::INFINITY),
            bounds(50.0, f64::INFINITY),
            0.0,
        );
        assert!(res.overflow);
        assert_eq!(res.first.width, 75.0);
        assert_eq!(res.second.width, 25.0);
    }

    #[test]
    fn infeasible_maxes_give_first_side_its_max() {
        let res = resolve_position(
            Orientation::Horizontal,
            Rect::from_size(300.0, 10.0),
            0.5,
            bounds(0.0, 80.0),
            bounds(0.0, 100.0),
            0.0,
        );
        assert!(!res.overflow);
        assert_eq!(res.first.width, 80.0);
        assert_eq!(res.second.width, 220.0);
    }

    #[test]
    fn set_position_clamps_and_cancels_animation() {
        let mut splitter = Splitter::new(Orientation::Horizontal, 0.5);
        splitter.animate_position(0.9, 4);
        assert!(splitter.animation().is_some());
        splitter.set_position(1.7);
        assert_eq!(splitter.position(), 1.0);
        assert!(splitter.animation().is_none());
    }

    #[test]
    fn animation_ends_exactly_on_target() {
        let mut splitter = Splitter::new(Orientation::Horizontal, 0.0);
        let target = 240.0 / 1000.0;
        splitter.animate_position(target, 7);
        let mut ticks = 0;
        while splitter.advance() == AnimationStatus::Continuing {
            ticks += 1;
            assert!(ticks < 100, "animation did not terminate");
        }
        assert_eq!(splitter.position(), target);
        assert!(ticks <= 7);
    }

    #[test]
    fn drawer_splitters_have_no_bar() {
        let mut splitter = Splitter::new(Orientation::Horizontal, 0.5);
        assert_eq!(splitter.bar_size(3.0), 3.0);
        splitter.drawer = Some(DockEdge::Left);
        assert_eq!(splitter.bar_size(3.0), 0.0);
    }

    #[test]
    fn best_position_honours_desired_extents() {
        let open = (0.0, f64::INFINITY);
        assert!((best_position(400.0, 100.0, 200.0, open, open) - 1.0 / 3.0).abs() < 1e-12);
        assert!((best_position(400.0, 300.0, 300.0, open, open) - 0.5).abs() < 1e-12);
        assert_eq!(best_position(400.0, 0.0, 0.0, open, open), 0.5);
        // Clamped by the other side's minimum.
        let clamped = best_position(400.0, 350.0, 10.0, open, (100.0, f64::INFINITY));
        assert!((clamped - 0.75).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn feasible_resolution_respects_bounds(
            extent in 50.0f64..2000.0,
            position in 0.0f64..=1.0,
            min1 in 0.0f64..200.0,
            min2 in 0.0f64..200.0,
            slack1 in 0.0f64..2000.0,
            slack2 in 0.0f64..2000.0,
        ) {
            let first = bounds(min1, min1 + slack1);
            let second = bounds(min2, min2 + slack2);
            let res = resolve_position(
                Orientation::Horizontal,
                Rect::from_size(extent, 10.0),
                position,
                first,
                second,
                3.0,
            );
            let available = extent - 3.0;
            prop_assert!((res.first.width + res.second.width - available).abs() < 1e-6);
            if min1 + min2 <= available {
                prop_assert!(!res.overflow);
                prop_assert!(res.first.width >= min1 - 1e-9);
                prop_assert!(res.second.width >= min2 - 1e-9);
                if min1 + slack1 + min2 + slack2 >= available {
                    prop_assert!(res.first.width <= min1 + slack1 + 1e-9);
                    prop_assert!(res.second.width <= min2 + slack2 + 1e-9);
                }
            } else {
                prop_assert!(res.overflow);
            }
        }
    }
}
