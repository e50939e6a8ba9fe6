//! The chat synchronization core: keeps a paginated, deduplicated,
//! ordered view of chats and their messages consistent with a remote
//! store mutated concurrently by the automated agent, the human
//! operator, and other operator sessions.

pub mod auth;
pub mod codec;
pub mod controller;
pub mod events;
pub mod state;

pub use controller::ConsoleController;
pub use events::ConsoleEvent;
pub use state::ViewState;
