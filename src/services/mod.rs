pub mod preferences;
pub mod tracking;

pub use preferences::{fold_event, PreferenceUpdater};
pub use tracking::InteractionService;
