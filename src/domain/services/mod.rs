mod chat;
mod conversations;
mod first_session;
mod hub_store;
mod persisted;
mod scroll_trigger;
mod viewport;

pub use chat::*;
pub use conversations::*;
pub use first_session::*;
pub use hub_store::*;
pub use persisted::*;
pub use scroll_trigger::*;
pub use viewport::*;
