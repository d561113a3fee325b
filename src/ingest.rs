use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{IngestError, RenderError};
use crate::http_renderer::HttpRenderer;
use crate::marcus_theatres::{DEFAULT_THEATRE_URL, LISTING_SELECTOR, extract_movies, listing_url};
use crate::store::{DateKey, ScheduleStore};
use crate::{DocumentHandle, Movie, Renderer};

pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 3;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Theatre page; the date is added as a `Date` query parameter.
    pub base_url: String,
    /// Number of consecutive days to fetch, today included.
    pub days: u32,
    /// Bound on waiting for the listing container of one date.
    pub wait_timeout: Duration,
    pub request_timeout: Duration,
    pub output: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_THEATRE_URL.to_string(),
            days: DEFAULT_LOOKAHEAD_DAYS,
            wait_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            output: PathBuf::from("movie-data.json"),
        }
    }
}

/// Progress of a single date through the run.
#[derive(Debug)]
pub enum DateState {
    Pending,
    Navigated(DocumentHandle),
    Extracted(Vec<Movie>),
    Failed(RenderError),
}

/// Outcome of a run: every requested date is in `store`, failed ones with an
/// empty list and their cause in `failures`.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub store: ScheduleStore,
    pub failures: Vec<(DateKey, RenderError)>,
}

async fn advance<R: Renderer>(
    renderer: &mut R,
    url: &str,
    state: DateState,
    wait: Duration,
) -> DateState {
    match state {
        DateState::Pending => match renderer.navigate(url).await {
            Ok(doc) => DateState::Navigated(doc),
            Err(e) => DateState::Failed(e),
        },
        DateState::Navigated(mut doc) => {
            match renderer.wait_for_selector(&mut doc, LISTING_SELECTOR, wait).await {
                Ok(()) => DateState::Extracted(renderer.evaluate(&doc, extract_movies)),
                Err(e) => DateState::Failed(e),
            }
        }
        done => done,
    }
}

async fn ingest_date<R: Renderer>(
    renderer: &mut R,
    url: &str,
    wait: Duration,
) -> Result<Vec<Movie>, RenderError> {
    let mut state = DateState::Pending;
    loop {
        state = match advance(renderer, url, state, wait).await {
            DateState::Extracted(movies) => return Ok(movies),
            DateState::Failed(e) => return Err(e),
            next => next,
        };
    }
}

/// Fetch `config.days` dates starting at `start`, one after the other on the
/// same session. A date that fails is stored empty and the run moves on.
pub async fn ingest_from<R: Renderer>(
    renderer: &mut R,
    config: &IngestConfig,
    start: DateKey,
) -> IngestReport {
    let mut report = IngestReport::default();
    for offset in 0..config.days {
        let Some(date) = start.plus_days(offset.into()) else {
            warn!(%start, offset, "date out of range, stopping");
            break;
        };
        let url = listing_url(&config.base_url, date);
        match ingest_date(renderer, &url, config.wait_timeout).await {
            Ok(movies) => {
                info!(%date, movies = movies.len(), "listing extracted");
                report.store.insert(date, movies);
            }
            Err(e) => {
                warn!(%date, "listing unavailable: {e}");
                report.store.insert(date, Vec::new());
                report.failures.push((date, e));
            }
        }
    }
    report
}

/// [`ingest_from`] starting at today's local date.
pub async fn ingest<R: Renderer>(renderer: &mut R, config: &IngestConfig) -> IngestReport {
    let today = DateKey::new(chrono::Local::now().date_naive());
    ingest_from(renderer, config, today).await
}

/// Ingest on `renderer`, close it, then write the store to `config.output`.
pub async fn run_with<R: Renderer>(
    mut renderer: R,
    config: &IngestConfig,
    start: DateKey,
) -> Result<IngestReport, IngestError> {
    let report = ingest_from(&mut renderer, config, start).await;
    if let Err(e) = renderer.close().await {
        warn!("closing renderer: {e}");
    }
    report.store.persist(&config.output)?;
    info!(
        path = %config.output.display(),
        dates = report.store.len(),
        failed = report.failures.len(),
        "schedule written"
    );
    Ok(report)
}

/// Start a session with `launch`, then [`run_with`]. When the session cannot
/// be started nothing is fetched and `config.output` is left alone.
pub async fn launch_and_run<R, L>(
    launch: L,
    config: &IngestConfig,
    start: DateKey,
) -> Result<IngestReport, IngestError>
where
    R: Renderer,
    L: FnOnce(&IngestConfig) -> Result<R, RenderError>,
{
    let renderer = launch(config).map_err(IngestError::Launch)?;
    run_with(renderer, config, start).await
}

/// Full run on an HTTP session starting today.
pub async fn run(config: &IngestConfig) -> Result<IngestReport, IngestError> {
    let today = DateKey::new(chrono::Local::now().date_naive());
    launch_and_run(|c| HttpRenderer::launch(c.request_timeout), config, today).await
}
