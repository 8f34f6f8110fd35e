//! Line-oriented wire protocol.
//!
//! A frame is a sequence of newline-terminated lines ending with one blank
//! line. The codec operates on the content lines (terminator excluded).

mod codec;
mod message;

pub use codec::{decode, encode};
pub use message::{Message, Status};
