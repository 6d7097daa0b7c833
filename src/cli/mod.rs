//! Command-line interface for operating the response cache.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::infrastructure::logging::SecretScrubber;

/// Print a command failure and exit with a non-zero status.
///
/// The error chain is scrubbed of store credentials before it is shown.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let scrubber = SecretScrubber::new();
    let message = scrubber.scrub_message(&format!("{err:#}"));

    if json_mode {
        let body = serde_json::json!({ "success": false, "error": message });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {message}");
    }
    std::process::exit(1);
}
