//! Client for the Sumo Logic Search Job API.
//!
//! A search runs in three caller-sequenced steps:
//! 1. [`SumoClient::start_search`] submits the query and time range and returns
//!    the job plus the session cookies that pin later requests to its node.
//! 2. [`SumoClient::get_search_job_status`] is polled, no faster than
//!    [`MIN_REQUEST_INTERVAL`], until [`JobState::is_terminal`].
//! 3. [`SumoClient::get_search_results`] fetches messages a page at a time.
//!
//! The client keeps no job state and never retries.

pub mod api;
pub mod error;
pub mod models;

pub use api::{
    encode_token, SessionCookie, SessionCookies, SumoClient, MIN_REQUEST_INTERVAL,
    RATE_LIMIT_PER_MINUTE,
};
pub use error::{Result, SumoError};
pub use models::sumo::{
    HistogramBucket, JobLink, JobState, SearchJob, SearchJobStatus, SearchRequest, SearchResult,
    SearchResultField, SearchResultMessage, SearchResultsRequest, JOB_STATE_DESCRIPTIONS,
    SEARCH_TIME_FORMAT,
};
