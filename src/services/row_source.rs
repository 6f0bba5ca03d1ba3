use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::services::hierarchy::SegmentTree;
use crate::services::row_parser::parse_rows;

pub const BEAN_QUERY: &str = "select date, flag, account, number";
pub const DEFAULT_BEAN_QUERY_COMMAND: &str = "bean-query";

/// Where the ledger result set is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSource {
    File(PathBuf),
    /// Fetched with GET, or with POST when a body is set.
    Url { url: String, body: Option<Vec<u8>> },
    /// A beancount ledger, queried by running `command` on it.
    BeanQuery { ledger: PathBuf, command: String },
}

impl RowSource {
    /// `http://` and `https://` locations become URL sources, anything else a file.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            RowSource::Url {
                url: location.to_string(),
                body: None,
            }
        } else {
            RowSource::File(PathBuf::from(location))
        }
    }

    pub fn bean_query(ledger: impl Into<PathBuf>) -> Self {
        RowSource::BeanQuery {
            ledger: ledger.into(),
            command: DEFAULT_BEAN_QUERY_COMMAND.to_string(),
        }
    }

    /// Sets the request body of a URL source, turning its GET into a POST.
    /// Other sources are returned unchanged.
    pub fn with_body(self, body: impl Into<Vec<u8>>) -> Self {
        match self {
            RowSource::Url { url, .. } => RowSource::Url {
                url,
                body: Some(body.into()),
            },
            other => other,
        }
    }

    pub async fn fetch(&self) -> AppResult<Vec<u8>> {
        match self {
            RowSource::File(path) => {
                debug!(path = %path.display(), "Reading rows from file");
                Ok(tokio::fs::read(path).await?)
            }
            RowSource::Url { url, body } => {
                debug!(url = %url, has_body = body.is_some(), "Fetching rows");
                let client = reqwest::Client::new();
                let request = match body {
                    Some(body) => client.post(url).body(body.clone()),
                    None => client.get(url),
                };
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AppError::Source(format!("{} returned {}", url, status)));
                }
                Ok(response.bytes().await?.to_vec())
            }
            RowSource::BeanQuery { ledger, command } => {
                debug!(ledger = %ledger.display(), command = %command, "Running bean-query");
                let output = Command::new(command)
                    .arg("-f")
                    .arg("csv")
                    .arg(ledger)
                    .arg(BEAN_QUERY)
                    .output()
                    .await
                    .map_err(|e| AppError::Source(format!("failed to run {}: {}", command, e)))?;
                if !output.status.success() {
                    return Err(AppError::Source(format!(
                        "{} exited with {}: {}",
                        command,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
                Ok(output.stdout)
            }
        }
    }
}

/// Fetches, parses and builds in one go. Nothing is returned unless every
/// row parsed.
pub async fn load_tree(source: &RowSource, delimiter: char) -> AppResult<SegmentTree> {
    let content = source.fetch().await?;
    let rows = parse_rows(&content, delimiter)?;
    let tree = SegmentTree::build(rows);
    info!(
        rows = tree.rows().len(),
        segments = tree.segment_count(),
        "Loaded ledger rows"
    );
    Ok(tree)
}
