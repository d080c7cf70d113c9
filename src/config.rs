// src/config.rs

use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_CHATBOX_USER_AGENT: &str = "Math-AI-Chatbox-Client/1.0";
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const MAX_QUESTION_COUNT: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// When absent the service runs on in-memory stores.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_statement_timeout_secs: u64,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
    pub chatbox: ChatboxConfig,
    pub quiz: QuizConfig,
}

/// Connection settings for the upstream LLM chatbox service.
#[derive(Debug, Clone)]
pub struct ChatboxConfig {
    pub url: Url,
    pub api_key: Option<String>,
    pub default_model: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: Option<RetryConfig>,
}

/// Fixed-delay retry policy for chatbox calls.
///
/// An empty `retryable_codes` list means "any 5xx".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay: Duration,
    pub retryable_codes: Vec<u16>,
}

impl RetryConfig {
    pub fn should_retry_status(&self, status: u16) -> bool {
        if self.retryable_codes.is_empty() {
            (500..600).contains(&status)
        } else {
            self.retryable_codes.contains(&status)
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Whether a second Submit may overwrite answers already stored on a row.
    pub allow_resubmit: bool,
    pub question_count: u32,
    pub subject: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            allow_resubmit: true,
            question_count: DEFAULT_QUESTION_COUNT,
            subject: "Mathematics".to_string(),
        }
    }
}

impl ChatboxConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            api_key: None,
            default_model: None,
            timeout: Duration::from_secs(60),
            user_agent: DEFAULT_CHATBOX_USER_AGENT.to_string(),
            retry: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let chatbox_url = env::var("CHATBOX_URL").expect("CHATBOX_URL must be set");
        let chatbox_url = Url::parse(&chatbox_url).expect("CHATBOX_URL must be a valid URL");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        let retry = env::var("CHATBOX_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|max| *max > 0)
            .map(|max_retries| RetryConfig {
                max_retries,
                delay: Duration::from_millis(env_or("CHATBOX_RETRY_DELAY_MS", 1000)),
                retryable_codes: env::var("CHATBOX_RETRYABLE_CODES")
                    .map(|v| parse_status_codes(&v))
                    .unwrap_or_default(),
            });

        let chatbox = ChatboxConfig {
            url: chatbox_url,
            api_key: env::var("CHATBOX_API_KEY").ok().filter(|v| !v.is_empty()),
            default_model: env::var("CHATBOX_MODEL").ok().filter(|v| !v.is_empty()),
            timeout: Duration::from_secs(env_or("CHATBOX_TIMEOUT_SECS", 60)),
            user_agent: DEFAULT_CHATBOX_USER_AGENT.to_string(),
            retry,
        };

        let quiz = QuizConfig {
            allow_resubmit: env_or("QUIZ_ALLOW_RESUBMIT", true),
            question_count: env_or("QUIZ_QUESTION_COUNT", DEFAULT_QUESTION_COUNT),
            subject: env::var("QUIZ_SUBJECT").unwrap_or_else(|_| "Mathematics".to_string()),
        };

        Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            db_statement_timeout_secs: env_or("DB_STATEMENT_TIMEOUT_SECS", 5),
            bind_addr: env_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000))),
            cors_origins,
            rust_log,
            chatbox,
            quiz,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_status_codes(raw: &str) -> Vec<u16> {
    split_list(raw)
        .iter()
        .filter_map(|code| code.parse::<u16>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_skip_garbage() {
        assert_eq!(parse_status_codes("502, 503,abc,,429"), vec![502, 503, 429]);
    }

    #[test]
    fn empty_code_list_retries_any_5xx() {
        let retry = RetryConfig {
            max_retries: 2,
            delay: Duration::from_millis(10),
            retryable_codes: vec![],
        };
        assert!(retry.should_retry_status(500));
        assert!(retry.should_retry_status(503));
        assert!(!retry.should_retry_status(404));
        assert!(!retry.should_retry_status(200));
    }

    #[test]
    fn listed_codes_only() {
        let retry = RetryConfig {
            max_retries: 2,
            delay: Duration::from_millis(10),
            retryable_codes: vec![429, 503],
        };
        assert!(retry.should_retry_status(429));
        assert!(retry.should_retry_status(503));
        assert!(!retry.should_retry_status(500));
    }
}
