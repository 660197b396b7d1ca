//! Chat transport: slash commands and free-text answers routed through the
//! per-user session store.

pub mod command;
pub mod conversation;

pub use conversation::Conversation;
