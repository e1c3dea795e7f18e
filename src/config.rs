use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use simplelog::LevelFilter;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.schoology.com/v1/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: Url,
    pub user_id: String,
    pub timeout: Duration,
    pub assignment: String,
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    // Reads the configuration from the process environment (after `.env` has been loaded).
    pub fn from_env(assignment_arg: Option<String>) -> Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok(), assignment_arg)
    }

    pub fn from_lookup<F>(lookup: F, assignment_arg: Option<String>) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("SPLUS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        // A base without a trailing slash would lose its last segment on join.
        let base = if base.ends_with('/') { base } else { format!("{}/", base) };
        let api_base = Url::parse(&base).with_context(|| format!("SPLUS_API_BASE `{}` is not a valid URL", base))?;

        let user_id = lookup("SPLUS_USER_ID")
            .filter(|id| !id.trim().is_empty())
            .context("SPLUS_USER_ID environment variable not found")?;

        let timeout = match lookup("SPLUS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| anyhow!("SPLUS_TIMEOUT_SECS must be a positive number of seconds, got `{}`", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let assignment = assignment_arg
            .or_else(|| lookup("SPLUS_ASSIGNMENT"))
            .context("No assignment given: pass an assignment URL or set SPLUS_ASSIGNMENT")?;

        let telegram = match (lookup("BOT_TOKEN"), lookup("CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id: chat_id
                    .trim()
                    .parse()
                    .with_context(|| format!("CHAT_ID `{}` is not a numeric chat id", chat_id))?,
            }),
            _ => None,
        };

        Ok(Config {
            api_base,
            user_id,
            timeout: Duration::from_secs(timeout),
            assignment,
            telegram,
        })
    }
}

// Log level from `SPLUS_LOG`, read before the rest of the configuration so that config errors get logged.
pub fn log_level() -> LevelFilter {
    std::env::var("SPLUS_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
