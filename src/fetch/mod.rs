mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{PipelineError, Result};

/// Downloads `url` in a single attempt.
///
/// Transport errors and non-2xx statuses both become
/// [`PipelineError::Fetch`]; nothing partial is returned.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let fetch_err = |status: Option<u16>, message: String| PipelineError::Fetch {
        source_id: url.to_string(),
        status,
        message,
    };

    let parsed = url
        .parse::<reqwest::Url>()
        .map_err(|e| fetch_err(None, e.to_string()))?;

    let resp = client
        .get_csv(parsed)
        .await
        .map_err(|e| fetch_err(None, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(fetch_err(Some(status.as_u16()), format!("HTTP status {status}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| fetch_err(Some(status.as_u16()), e.to_string()))?;
    Ok(bytes.to_vec())
}
