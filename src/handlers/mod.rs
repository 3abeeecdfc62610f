pub mod interactions;
pub mod preferences;

pub use interactions::{track_interaction, TrackingHandlerState};
pub use preferences::get_preferences;
