//! Harvest core: source model, per-source state machine and run tally.
//!
//! Nothing in this crate performs IO. The engine feeds stage outcomes into
//! [`update`] and executes the [`Effect`] it returns.
mod effect;
mod msg;
mod naming;
mod source;
mod state;
mod tally;
mod update;

pub use effect::{ContentKind, Effect};
pub use msg::Msg;
pub use naming::sanitize_name;
pub use source::{Category, Locator, LocatorError, Source};
pub use state::{SourcePlan, SourceState, Stage, SummaryStatus};
pub use tally::RunTally;
pub use update::update;
