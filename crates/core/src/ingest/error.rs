use reqwest::StatusCode;

/// Failure to obtain the ticker listing. Always fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("ticker request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("ticker endpoint returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("ticker response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}
