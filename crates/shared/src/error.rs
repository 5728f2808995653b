use thiserror::Error;

use crate::providers::Provider;

/// Errors from salary parsing and comparison.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SalaryError {
    /// The input was not a "MIN-MAX" range of two integers.
    #[error("salary range must look like MIN-MAX, got {0:?}")]
    InvalidRange(String),

    /// A comparison was requested against a vacancy with no salary.
    #[error("vacancy has no salary to compare")]
    Unspecified,
}

/// Errors from fetching vacancies off a job board.
///
/// An empty result set is not an error; `Ok(vec![])` and `Err(_)` are
/// deliberately distinct outcomes.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0} requires an API key; set SJ_API_KEY in the environment")]
    MissingCredential(Provider),

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: Provider,
        status: reqwest::StatusCode,
        body: String,
    },
}
