mod conversation;
mod gateway;
mod message;
mod onboarding;
mod preferences;
mod storage;
mod trigger;

pub use conversation::*;
pub use gateway::*;
pub use message::*;
pub use onboarding::*;
pub use preferences::*;
pub use storage::*;
pub use trigger::*;
