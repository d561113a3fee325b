use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::store::DateKey;
use crate::{Movie, Screening};

/// North Shore Cinema, Mequon.
pub const DEFAULT_THEATRE_URL: &str =
    "https://www.marcustheatres.com/theatre-locations/north-shore-cinema-mequon";

/// One listing block per movie; the page is ready once one is present.
pub const LISTING_SELECTOR: &str = ".movie-showtimes";

static LISTING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(LISTING_SELECTOR).expect("invalid selector: listing")
});
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".movie-title").expect("invalid selector: title"));
static POSTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".movie-info__poster-img").expect("invalid selector: poster"));
static DETAILS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".movie-showtimes__info--details").expect("invalid selector: details")
});
static RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rating-link").expect("invalid selector: rating"));
static SCREEN_TYPE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".movie-showtimes__screen-type").expect("invalid selector: screen type")
});
static SCREEN_LABEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".screen-type__text").expect("invalid selector: screen label")
});
static STRONG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("invalid selector: strong"));
static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("invalid selector: img"));
static SHOWTIME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".movie-showtime--a, .matinee").expect("invalid selector: showtime")
});

/// Stored as printed; only the plural "minutes" form is taken from the page.
static RE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*hours?,\s*(\d+)\s*minutes").expect("invalid regex: duration")
});

/// Listing page for one date, e.g. `...north-shore-cinema-mequon?Date=2025-03-01`.
pub fn listing_url(base_url: &str, date: DateKey) -> String {
    format!("{}?Date={}", base_url.trim_end_matches('/'), date)
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Split the details line ("PG13 | 2 hours, 15 minutes | Drama, Music")
/// into its duration and genres parts.
fn split_details(details: &str) -> (String, String) {
    let duration = RE_DURATION
        .find(details)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let genres = details
        .split('|')
        .nth(2)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    (duration, genres)
}

/// Screen name from the bold label, falling back to the logo's alt text.
fn screen_name(screen_type: ElementRef) -> Option<String> {
    let label = screen_type.select(&SCREEN_LABEL).next()?;
    label
        .select(&STRONG)
        .next()
        .map(text_of)
        .and_then(non_empty)
        .or_else(|| {
            label
                .select(&IMG)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .map(|alt| alt.trim().to_string())
                .and_then(non_empty)
        })
}

fn screening(screen_type: ElementRef) -> Option<Screening> {
    let screen = screen_name(screen_type)?;
    let times: Vec<String> = screen_type
        .select(&SHOWTIME)
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect();
    if times.is_empty() {
        return None;
    }
    Some(Screening { screen, times })
}

fn movie(block: ElementRef) -> Movie {
    let details = block.select(&DETAILS).next();
    let rating = details.map(|d| first_text(d, &RATING)).unwrap_or_default();
    let details_text = details.map(text_of).unwrap_or_default();
    let (duration, genres) = split_details(&details_text);

    let poster = block
        .select(&POSTER)
        .next()
        .and_then(|img| img.value().attr("data-src"))
        .unwrap_or("")
        .to_string();

    Movie {
        title: first_text(block, &TITLE),
        poster,
        rating,
        duration,
        genres,
        screenings: block.select(&SCREEN_TYPE).filter_map(screening).collect(),
    }
}

/// All movies on a rendered listing page, in page order.
///
/// Blocks with the same title (e.g. a 3D and a 2D listing) stay separate.
/// Missing fields come back empty; screen types without a name or without
/// any showtime are left out. A page with no listing blocks yields nothing.
pub fn extract_movies(document: &Html) -> Vec<Movie> {
    document.select(&LISTING).map(movie).collect()
}
