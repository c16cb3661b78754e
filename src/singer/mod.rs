//! Singer protocol messages and output

pub mod emitter;
pub mod messages;

pub use emitter::MessageWriter;
pub use messages::Message;
