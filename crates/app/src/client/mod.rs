//! Consumer-side API client. Models how a presentation layer drives the
//! service: start a job, then poll its status until it is terminal.

mod api;
mod errors;
mod models;
mod poller;

pub use api::ApiClient;
pub use errors::ClientError;
pub use models::{JobReport, ResultSummary, StartJob};
pub use poller::{PollPolicy, poll_until_terminal};
