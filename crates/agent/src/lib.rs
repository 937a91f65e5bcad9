pub mod context;
pub mod generate;
pub mod handler;
pub mod mrkdwn;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{build_messages, system_prompt};
pub use generate::{Generator, DEFAULT_MAX_STEPS};
pub use handler::EventHandler;
pub use mrkdwn::to_mrkdwn;
pub use status::{AssistantThreadStatus, MessageUpdateStatus};
