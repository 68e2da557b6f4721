pub mod controller;
pub mod error;
pub mod ledger;
pub mod phase;

pub use controller::{LifecycleController, run_boot_sequence};
pub use error::LifecycleError;
pub use ledger::{ErrorCollector, StateLedger};
pub use phase::Phase;
