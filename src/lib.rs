//! Core machinery of a stacking X11 window manager.
//!
//! Three subsystems carry the behavior: [`stacking`] keeps the server
//! stacking order partitioned into priority bands, [`bindings`] turns
//! key and button events into commands through a keymode-aware binding
//! forest, and [`window`] drives the per-window state machine with its
//! geometry arithmetic (gravity, snapping, resize, tab groups).
//!
//! Everything display-specific sits behind small traits
//! ([`stacking::ServerStack`], [`bindings::GrabOps`], [`frame::Frame`],
//! [`frame::Screen`], [`remember::Remember`]) so the core runs, and is
//! tested, without a display connection.

pub mod bindings;
pub mod commands;
pub mod constants;
pub mod event_loop;
pub mod frame;
pub mod remember;
pub mod stacking;
pub mod tracing_sub;
pub mod window;

pub use event_loop::{ControlFlow, EventLoop, LoopEvent, TimerQueue};
