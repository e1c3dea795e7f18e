mod config;
mod error;
mod models;
mod utils;
use dotenv::dotenv;
use log::{debug, error, info, warn};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};
use crate::config::{log_level, Config, TelegramConfig};
use crate::utils::api::SchoologyClient;
use crate::utils::render;
use crate::utils::widgets::render_widgets;

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    // Initializes logging with simplelog to the terminal with mixed output (both stdout and stderr) and automatic color support.
    if let Err(e) = TermLogger::init(
        log_level(),
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto
    ) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = match Config::from_env(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return;
        },
    };

    // Ctrl-C drops every pending request instead of waiting on them.
    tokio::select! {
        _ = run(config) => {},
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, pending requests were cancelled"),
    }
}

async fn run(config: Config) {
    let api = match SchoologyClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            error!("Error creating the API client: {:#}", e);
            return;
        },
    };

    let widgets = render_widgets(&api, &config.assignment).await;

    if let Some(payload) = widgets.statistics {
        debug!("Statistics payload: {}", serde_json::to_string(&payload).unwrap_or_default());
        deliver(&config.telegram, &render::statistics_message(&payload)).await;
    }

    if let Some(payload) = widgets.significance {
        debug!("Significance payload: {}", serde_json::to_string(&payload).unwrap_or_default());
        deliver(&config.telegram, &render::significance_message(&payload)).await;
    }
}

async fn deliver(telegram: &Option<TelegramConfig>, message: &str) {
    info!("\n{}", message);
    if let Some(telegram) = telegram {
        render::send(telegram, message).await;
    }
}
