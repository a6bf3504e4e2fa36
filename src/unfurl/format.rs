//! Text helpers shared by the attachment builders.

use chrono::{DateTime, NaiveDate};
use html2text::render::TrivialDecorator;
use tracing::warn;

use crate::gitlab::models::User;

pub const DEFAULT_DESCRIPTION_WIDTH: usize = 100;
pub const LONG_DESCRIPTION_WIDTH: usize = 300;

const ELLIPSIS: char = '…';
const RENDER_WIDTH: usize = 10_000;

/// Remove HTML tags and comments, keeping only their text content.
#[must_use]
pub fn strip_html_tags(value: &str) -> String {
    // Raw mode keeps table cells as plain lines instead of drawing borders.
    match html2text::config::with_decorator(TrivialDecorator::new())
        .raw_mode(true)
        .string_from_read(value.as_bytes(), RENDER_WIDTH)
    {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to strip HTML from text: {}", e);
            value.to_string()
        }
    }
}

/// Strip markup and shorten a description to fit within `width` characters.
#[must_use]
pub fn prepare_description(description: &str, width: usize) -> String {
    shorten(strip_html_tags(description).trim(), width)
}

/// Collapse whitespace and cut on a word boundary so the result, including
/// the trailing ellipsis, is at most `width` characters.
#[must_use]
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(1);
    let mut out = String::new();
    let mut len = 0;
    for word in &words {
        let word_len = word.chars().count();
        let needed = if out.is_empty() { word_len } else { len + 1 + word_len };
        if needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        len = needed;
    }

    if out.is_empty() {
        // A single word longer than the budget is hard-cut.
        out = words
            .first()
            .map(|w| w.chars().take(budget).collect())
            .unwrap_or_default();
    }
    out.push(ELLIPSIS);
    out
}

#[must_use]
pub fn format_user(user: &User, warn_blocked: bool) -> String {
    if user.state == "blocked" {
        let tag = if warn_blocked {
            "(blocked) :warning:"
        } else {
            "(blocked)"
        };
        return format!("{} {tag}", user.username);
    }
    user.username.clone()
}

/// Unix seconds of an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Slack date token, e.g. `<!date^1537574400^{date_short_pretty}|2018-09-22>`.
#[must_use]
pub fn slack_formatted_date(raw: &str) -> String {
    slack_date_token(raw, "{date_short_pretty}")
}

#[must_use]
pub fn slack_formatted_datetime(raw: &str) -> String {
    slack_date_token(raw, "{date_short_pretty} - {time_secs}")
}

fn slack_date_token(raw: &str, format: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format!("<!date^{ts}^{format}|{raw}>"),
        None => raw.to_string(),
    }
}

#[must_use]
pub fn issue_color(state: &str) -> Option<String> {
    let color = match state {
        "opened" => "#1aaa55",
        "closed" => "#1f78d1",
        _ => return None,
    };
    Some(color.to_string())
}

#[must_use]
pub fn merge_request_color(state: &str) -> Option<String> {
    let color = match state {
        "opened" => "#1aaa55",
        "merged" => "#1f78d1",
        "closed" => "#db3b21",
        _ => return None,
    };
    Some(color.to_string())
}

#[must_use]
pub fn ci_color(status: &str) -> Option<String> {
    let color = match status {
        "created" | "pending" | "skipped" | "manual" => "#1f78d1",
        "running" | "success" => "#1aaa55",
        "failed" => "#db3b21",
        "canceled" => "#FDBF2C",
        _ => return None,
    };
    Some(color.to_string())
}
