use log::{info, warn};
use teloxide::Bot;
use teloxide::prelude::{ChatId, Requester};
use crate::config::TelegramConfig;
use crate::models::{SignificancePayload, StatisticsPayload};

fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{}%", value),
        None => "N/A".to_string(),
    }
}

// Severity label for a hue, so the message reads without colours.
fn severity(hue: f64) -> &'static str {
    if hue < 40.0 {
        "🔴 high"
    } else if hue < 80.0 {
        "🟠 moderate"
    } else {
        "🟢 low"
    }
}

pub fn statistics_message(payload: &StatisticsPayload) -> String {
    let mut message = String::from("📊 Assignment Details\n");
    message.push_str(&format!("Points: {}\n", payload.points));
    message.push_str(&format!("Grading Category: {}", payload.grading_category));
    message
}

pub fn significance_message(payload: &SignificancePayload) -> String {
    let mut message = format!("🎯 Significance in {}\n", payload.category_title);
    message.push_str(&format!("Current: {}\n", percent(payload.current_percent)));
    message.push_str(&format!("If fully earned: {}\n", percent(payload.projected_percent)));
    message.push_str(&format!("Impact: {} (hue {:.0})", severity(payload.hue), payload.hue));
    message
}

// Sends a rendered widget to the configured chat; failures are only logged.
pub async fn send(telegram: &TelegramConfig, message: &str) {
    let bot = Bot::new(telegram.bot_token.clone());

    match bot.send_message(ChatId(telegram.chat_id), message).await {
        Ok(message) => info!("Text message sent successfully {:?}", message.id),
        Err(e) => warn!("Text message wasn't sent because of: {}", e)
    };
}
