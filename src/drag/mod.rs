//! Pointer-driven drag-and-drop for folder rows.
//!
//! [`DragSession`] owns the lifecycle and timers, [`classify`] maps a pointer to a drop zone,
//! and [`build_move_request`] turns the final drop into a [`crate::MoveRequest`].

mod clock;
mod move_command;
mod options;
mod session;
mod zone;


pub use clock::{Clock, ManualClock, SystemClock};
pub use move_command::{DropTarget, build_move_request};
pub use options::DragOptions;
pub use session::{DragEvent, DragPhase, DragSession, DragState, HitTest, NodeHit};
pub use zone::{AFTER_FRACTION, BEFORE_FRACTION, DropZone, classify};
