use std::env;
use std::path::PathBuf;

use crate::services::row_source::{RowSource, DEFAULT_BEAN_QUERY_COMMAND};

pub const DEFAULT_DAYS_PER_SAMPLE: u32 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Where the ledger rows come from. `None` starts with an empty tree.
    pub source: Option<RowSource>,
    pub account_delimiter: char,
    pub days_per_sample: u32,
    pub static_path: PathBuf,
    /// Command run on beancount ledgers, both configured and uploaded.
    pub bean_query_command: String,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7071,
            source: None,
            account_delimiter: ':',
            days_per_sample: DEFAULT_DAYS_PER_SAMPLE,
            static_path: PathBuf::from("static"),
            bean_query_command: DEFAULT_BEAN_QUERY_COMMAND.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bean_query_command = env::var("LEDGER_GRAPHS_BEAN_QUERY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BEAN_QUERY_COMMAND.into());

        // A beancount ledger wins over a plain CSV source.
        let source = match env::var("LEDGER_GRAPHS_BEANCOUNT_FILE") {
            Ok(path) if !path.trim().is_empty() => Some(RowSource::BeanQuery {
                ledger: PathBuf::from(path),
                command: bean_query_command.clone(),
            }),
            _ => env::var("LEDGER_GRAPHS_SOURCE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    let source = RowSource::parse(&s);
                    match env::var("LEDGER_GRAPHS_SOURCE_BODY") {
                        Ok(body) => source.with_body(body),
                        Err(_) => source,
                    }
                }),
        };

        let days_per_sample = env::var("LEDGER_GRAPHS_DAYS_PER_SAMPLE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&v| v >= 1)
            .unwrap_or(DEFAULT_DAYS_PER_SAMPLE);

        let account_delimiter = env::var("LEDGER_GRAPHS_ACCOUNT_DELIMITER")
            .ok()
            .and_then(|v| v.chars().next())
            .unwrap_or(':');

        Self {
            host: env::var("LEDGER_GRAPHS_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("LEDGER_GRAPHS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7071),
            source,
            account_delimiter,
            days_per_sample,
            static_path: env::var("LEDGER_GRAPHS_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            bean_query_command,
            max_upload_bytes: env::var("LEDGER_GRAPHS_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
