pub mod controller;
pub mod query;
pub mod transport;

pub use controller::{
    ControllerError, LaunchAttempt, LaunchController, LaunchEvent, LaunchPhase, LaunchState,
    LAUNCH_TIMEOUT,
};
pub use query::{draft_from_query, draft_to_query};
pub use transport::{BotLaunchTransport, HttpBotLaunchTransport};
