pub mod channel;
pub mod event;
pub mod traits;
pub mod types;

pub use channel::PluginChannel;
pub use event::{EventKind, LifecycleEvent};
pub use traits::{EventHandler, Plugin};
pub use types::{PluginMeta, PluginState};
