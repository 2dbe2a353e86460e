//! Input handling: event types, the click-vs-drag state machine, and the
//! input processor that converts raw window events into viewer commands.

/// Commands produced by the input processor.
pub mod command;
/// Platform-agnostic input events.
pub mod event;
/// Pointer tracking and click detection.
pub(crate) mod mouse;
/// Converts raw events into viewer commands.
pub mod processor;

pub use command::ViewerCommand;
pub use event::{InputEvent, MouseButton};
pub use processor::InputProcessor;
