pub mod client;
pub mod poller;

pub use client::ApiClient;
pub use poller::{PollConfig, PollOutcome};
pub use wabridge_api;
