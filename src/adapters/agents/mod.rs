//! Agent capability adapters.

pub mod mock;
pub mod registry;
pub mod scripted;

pub use mock::{MockAgent, MockFixGenerator, MockReply};
pub use registry::AgentRegistry;
pub use scripted::{default_artifact, ScriptedAgent};
