use std::process::ExitCode;

use craft_cost_tracker::{
    app,
    util::{config::TrackerConfig, logging::init_logging, version::{version_label, APP_NAME}},
};
use tracing::error;

fn main() -> ExitCode {
    let config = TrackerConfig::from_env();
    init_logging(&config.log_filter);
    tracing::info!("{} {}", APP_NAME, version_label());

    let summary = match app::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            error!(%err, "failed to open session");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "failed to encode session summary");
            ExitCode::FAILURE
        }
    }
}
