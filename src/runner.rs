use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::time::Duration;
use sumo_search::{
    JobState, SearchRequest, SearchResult, SearchResultsRequest, SumoClient, MIN_REQUEST_INTERVAL,
};

pub struct RunOptions {
    pub poll_interval: Duration,
    pub offset: u64,
    pub limit: u64,
}

/// Starts a job, waits for it to stop gathering, then fetches one page.
pub async fn run_search(
    client: &SumoClient,
    request: &SearchRequest,
    options: &RunOptions,
) -> Result<SearchResult> {
    let interval = options.poll_interval.max(MIN_REQUEST_INTERVAL);

    let (job, cookies) = client
        .start_search(request)
        .await
        .context("Failed to start search job")?;
    let job_id = job.id.context("Search job accepted without an id")?;
    info!("Job {} started ({} cookies)", job_id, cookies.len());

    let status = loop {
        let status = client
            .get_search_job_status(&job_id, &cookies)
            .await
            .context(format!("Failed to get status for job {}", job_id))?;

        info!(
            "Job {}: {} ({} messages, {} records)",
            job_id, status.state, status.message_count, status.record_count
        );
        for warning in &status.pending_warnings {
            warn!("Job {} warning: {}", job_id, warning);
        }
        for err in &status.pending_errors {
            warn!("Job {} error: {}", job_id, err);
        }

        if status.state.is_terminal() {
            break status;
        }
        tokio::time::sleep(interval).await;
    };

    if let Some(description) = status.state.description() {
        info!("{}", description);
    }
    if status.state == JobState::Canceled {
        bail!("Search job {} was canceled", job_id);
    }

    let page = SearchResultsRequest::new(job_id, options.offset, options.limit);
    client
        .get_search_results(&page, &cookies)
        .await
        .context(format!("Failed to fetch messages for job {}", page.job_id))
}
