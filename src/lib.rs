use std::time::Duration;

use scraper::Html;
use serde::{Deserialize, Serialize};

pub mod calendar;
pub mod error;
pub mod http_renderer;
pub mod ingest;
pub mod marcus_theatres;
pub mod showtime;
pub mod store;

pub use calendar::{CalendarEvent, DayView, day_events, day_schedule, normalize};
pub use error::{IngestError, MalformedTime, RenderError, StoreError};
pub use ingest::{
    DateState, IngestConfig, IngestReport, ingest, ingest_from, launch_and_run, run, run_with,
};
pub use showtime::{parse_duration, parse_time_of_day};
pub use store::{DateKey, ScheduleStore};

/// One presentation format (standard, IMAX, ...) and the times it plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screening {
    pub screen: String,
    /// Raw listing text, in listing order, e.g. "7:30 PM".
    pub times: Vec<String>,
}

/// Common movie record produced by the extractor and kept in the store.
///
/// `duration` and the screening times are kept as the listing printed them;
/// parsing happens at display time (see [`calendar`]).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    pub poster: String,
    pub rating: String,
    pub duration: String,
    pub genres: String,
    pub screenings: Vec<Screening>,
}

/// A page the renderer has navigated to.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub url: String,
    /// Markup as currently rendered.
    pub markup: String,
}

impl DocumentHandle {
    pub fn new(url: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markup: markup.into(),
        }
    }
}

/// Browser-like capability the ingestion loop drives.
///
/// One session is used for a whole run; `close` is called exactly once
/// when the run is over, whatever happened to the individual dates.
#[async_trait::async_trait]
pub trait Renderer: Send + Sized {
    /// Load `url` and return a handle to the rendered document.
    async fn navigate(&mut self, url: &str) -> Result<DocumentHandle, RenderError>;

    /// Wait until `selector` matches something in the document, or fail
    /// with [`RenderError::Timeout`] once `timeout` has elapsed.
    async fn wait_for_selector(
        &mut self,
        doc: &mut DocumentHandle,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError>;

    /// Run `f` against the rendered document tree.
    fn evaluate<T, F>(&self, doc: &DocumentHandle, f: F) -> T
    where
        F: FnOnce(&Html) -> T,
    {
        let document = Html::parse_document(&doc.markup);
        f(&document)
    }

    /// Release the session.
    async fn close(self) -> Result<(), RenderError>;
}
