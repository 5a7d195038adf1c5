//! Report delivery through the Telegram Bot API.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::TelegramConfig;

/// Bot API limit on message length, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

const PRE_OPEN: &str = "<pre>";
const PRE_CLOSE: &str = "</pre>";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    /// Sends `report` as preformatted HTML, split into as many messages as
    /// the length limit requires. Returns `false` if any message failed.
    pub async fn send_report(&self, report: &str) -> bool {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        );

        for (i, message) in split_messages(report).iter().enumerate() {
            let body = SendMessage {
                chat_id: &self.config.chat_id,
                text: message,
                parse_mode: "HTML",
            };
            match self.client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Telegram message {} delivered", i + 1);
                }
                Ok(response) => {
                    warn!("Telegram rejected message {}: HTTP {}", i + 1, response.status());
                    return false;
                }
                Err(e) => {
                    warn!("Error sending Telegram message: {}", e);
                    return false;
                }
            }
        }
        true
    }
}

/// Escapes the characters the Bot API treats as HTML markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes `line`, cutting it so the escaped text has at most `budget`
/// characters. The cut never falls inside an entity.
fn escape_line(line: &str, budget: usize) -> (String, usize) {
    let mut escaped = String::with_capacity(line.len());
    let mut len = 0;
    for c in line.chars() {
        let piece = escape_html(c.encode_utf8(&mut [0; 4]));
        let piece_len = piece.chars().count();
        if len + piece_len > budget {
            break;
        }
        escaped.push_str(&piece);
        len += piece_len;
    }
    (escaped, len)
}

/// Wraps `report` in `<pre>` blocks of at most [`MESSAGE_LIMIT`] characters,
/// breaking only between lines. A single line longer than the limit is cut.
pub fn split_messages(report: &str) -> Vec<String> {
    let budget = MESSAGE_LIMIT - PRE_OPEN.len() - PRE_CLOSE.len();
    let mut chunks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for line in report.lines() {
        let (line, line_len) = escape_line(line, budget);

        // Every line after the first costs one extra character for its newline
        if !current.is_empty() && current_len + 1 + line_len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += if current.is_empty() { line_len } else { line_len + 1 };
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .map(|lines| format!("{}{}{}", PRE_OPEN, lines.join("\n"), PRE_CLOSE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn notifier(base_url: String) -> TelegramNotifier {
        TelegramNotifier::new(
            TelegramConfig {
                bot_token: "123:abc".to_string(),
                chat_id: "42".to_string(),
                api_url: base_url,
            },
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B <c>"), "A &amp; B &lt;c&gt;");
    }

    #[test]
    fn test_short_report_is_one_message() {
        let messages = split_messages("line one\nline <two>");
        assert_eq!(messages, vec!["<pre>line one\nline &lt;two&gt;</pre>"]);
    }

    #[test]
    fn test_long_report_splits_on_lines() {
        let line = "x".repeat(1000);
        let report = vec![line.as_str(); 10].join("\n");

        let messages = split_messages(&report);
        assert_eq!(messages.len(), 3);
        for message in &messages {
            assert!(message.chars().count() <= MESSAGE_LIMIT);
            let inner = message.trim_start_matches(PRE_OPEN).trim_end_matches(PRE_CLOSE);
            assert!(inner.split('\n').all(|l| l == line));
        }
    }

    #[test]
    fn test_long_line_is_cut_outside_entities() {
        let budget = MESSAGE_LIMIT - PRE_OPEN.len() - PRE_CLOSE.len();
        let line = format!("{}&&&", "x".repeat(budget - 3));

        let messages = split_messages(&line);
        assert_eq!(messages.len(), 1);
        let inner = messages[0].trim_start_matches(PRE_OPEN).trim_end_matches(PRE_CLOSE);
        assert_eq!(inner, "x".repeat(budget - 3));
        assert!(messages[0].chars().count() <= MESSAGE_LIMIT);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(split_messages("\nA\n\nB"), vec!["<pre>\nA\n\nB</pre>"]);

        let line = "x".repeat(3000);
        let report = format!("{}\n\n{}", line, line);
        let messages = split_messages(&report);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], format!("<pre>{}\n</pre>", line));
        assert_eq!(messages[1], format!("<pre>{}</pre>", line));
    }

    #[tokio::test]
    async fn test_send_report_posts_html() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/bot123:abc/sendMessage")
                    .json_body(json!({
                        "chat_id": "42",
                        "text": "<pre>TOTAL: 1 &lt; 2</pre>",
                        "parse_mode": "HTML"
                    }));
                then.status(200).json_body(json!({"ok": true}));
            })
            .await;

        assert!(notifier(server.base_url()).send_report("TOTAL: 1 < 2").await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_failure_returns_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(401);
            })
            .await;

        assert!(!notifier(server.base_url()).send_report("report").await);
    }
}
