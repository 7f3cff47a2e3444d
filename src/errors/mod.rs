use thiserror::Error;

/// Failures of the fetch step. Terminal for one scrape invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("render failed: {0}")]
    #[cfg_attr(not(feature = "render"), allow(dead_code))]
    Render(String),

    #[error("no renderer available")]
    RenderUnavailable,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout;
        }
        if let Some(status) = err.status() {
            return TransportError::Status(status.as_u16());
        }
        TransportError::Network(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Markup that cannot be treated as a document at all.
    #[error("unusable markup: {0}")]
    Parse(String),
}

/// Why a single anchor, container or row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingAnchor,
    OutsideAllowList,
    ShortTitle,
    UnresolvableLink,
    TooFewCells,
    MissingDate,
    InvalidDate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::MissingAnchor => "no anchor with href",
            SkipReason::OutsideAllowList => "href outside article paths",
            SkipReason::ShortTitle => "title too short",
            SkipReason::UnresolvableLink => "link not absolute",
            SkipReason::TooFewCells => "too few cells",
            SkipReason::MissingDate => "no date text",
            SkipReason::InvalidDate => "date not on the calendar",
        };
        f.write_str(s)
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
