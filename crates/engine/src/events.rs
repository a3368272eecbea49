//! Pointer-event unification.
//!
//! Mouse and touch input collapse into one event shape with three logical
//! phases, so the interaction components never see a windowing system.

use foundation::math::Vec2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse {
        x: f64,
        y: f64,
    },
    Touch {
        /// Touch points currently on the surface.
        touches: Vec<Vec2>,
        /// Touch points that changed in this event; on the up phase these are
        /// the lifted fingers, and the only position source.
        changed: Vec<Vec2>,
    },
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64) -> Self {
        PointerEvent::Mouse { x, y }
    }

    pub fn touch(touches: Vec<Vec2>, changed: Vec<Vec2>) -> Self {
        PointerEvent::Touch { touches, changed }
    }

    /// Document-space position for the given phase.
    ///
    /// Touch events with no usable point resolve to `None`; callers skip the
    /// event rather than fault.
    pub fn position(&self, phase: PointerPhase) -> Option<Vec2> {
        match self {
            PointerEvent::Mouse { x, y } => Some(Vec2::new(*x, *y)),
            PointerEvent::Touch { touches, changed } => match phase {
                PointerPhase::Up => changed.first().copied(),
                PointerPhase::Down | PointerPhase::Move => touches.first().copied(),
            },
        }
    }
}
