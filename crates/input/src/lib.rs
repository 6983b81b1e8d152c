//! Input: a single ordered stream of tagged events.
//!
//! Hosts translate their native window events into [`InputEvent`]s and feed
//! them to consumers in arrival order. Consumers are reducers over that
//! stream and never poll device state.
//!
//! # Invariants
//! - Key state changes are edges: a key held before the stream starts is
//!   invisible until its next press or release.

mod bindings;
mod event;

pub use bindings::{Direction, KeyBindings};
pub use event::{InputEvent, Key, PointerButton};
