//! Collaborators the engine talks to: the text-completion service, the
//! durable world store, and the viewer transport.

pub mod broadcast;
pub mod completion;
pub mod store;

pub use broadcast::{Broadcaster, ChannelBroadcaster};
pub use completion::{OpenAiCompatClient, SilentCompletion, TextCompletion};
pub use store::{FileStore, MemoryStore, WorldStore};
