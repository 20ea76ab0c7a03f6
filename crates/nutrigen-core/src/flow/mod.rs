//! The generation and swap flows as a pure state machine.
//!
//! [`transition`] maps an [`AppState`] and an [`Event`] to the next state
//! and, where the event starts planner work, an [`Effect`] describing the
//! call to make. The caller performs the call and feeds the outcome back in
//! as another event carrying the same [`RequestToken`]. Nothing here does
//! I/O, so every path is unit-testable without a planner.

pub mod state;
pub mod transition;

pub use state::{AppState, Notice, NoticeKind, RequestToken, Stage, SwapState, SwapTarget};
pub use transition::{Effect, Event, Transition, TransitionError, transition};
