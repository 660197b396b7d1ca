pub mod store;
pub mod wizard;

pub use store::{Session, SessionStore};
pub use wizard::{GoalSetup, SetupAnswer};
