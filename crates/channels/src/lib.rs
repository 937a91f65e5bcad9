pub mod directory;
pub mod events;
pub mod slack;
pub mod thread;
pub mod verify;

pub use events::{EventEnvelope, EventKind, SlackEvent};
pub use slack::{SlackApi, SlackClient};
pub use verify::RequestVerifier;
