use thiserror::Error;

/// Errors raised while reading or writing the schedule file. These never
/// escape the store boundary: loads degrade to the empty state and saves
/// report failure as a flag.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read/write schedule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode schedule state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised while handing an email to the mail provider
#[derive(Error, Debug)]
pub enum MailError {
    #[error("mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail credentials not configured")]
    NotConfigured,
}
