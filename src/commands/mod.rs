//! Application command handlers.
//!
//! # Commands
//! - `record`: timed end-to-end diagnostic run of the full pipeline
//! - `auth`: update one leg's provider settings; `hotkey` sets the global key
//! - `providers`: list the AI provider catalog
//! - `config`: open the settings file in the user's preferred editor
//! - `logs`: display recent log entries

pub mod auth;
pub mod config;
pub mod logs;
pub mod providers;
pub mod record;

pub use auth::{handle_auth, handle_hotkey, AuthUpdate};
pub use config::handle_config;
pub use logs::handle_logs;
pub use providers::handle_providers;
pub use record::handle_record;
