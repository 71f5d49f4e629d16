pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod notifier;
pub mod player;
pub mod scenario;
pub mod tracks;
pub mod utils;
