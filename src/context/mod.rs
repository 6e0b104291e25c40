//! Conversation context passed explicitly through the pipeline.

mod memory;

pub use memory::{ConversationContext, Role, Turn};
