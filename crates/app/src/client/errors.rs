//! Client errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api url")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed")]
    Http(#[from] reqwest::Error),

    /// Any non-2xx response; terminal for that call.
    #[error("{kind}: {message} (HTTP {status})")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("not signed in")]
    NotSignedIn,

    #[error("job did not finish within {}s", .elapsed.as_secs())]
    PollTimeout { elapsed: Duration },
}
