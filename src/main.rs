use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use showtime_scrape::marcus_theatres::DEFAULT_THEATRE_URL;
use showtime_scrape::{DateKey, DayView, IngestConfig, ScheduleStore, day_schedule};

#[derive(Parser)]
#[command(name = "showtime-scrape", about = "Theatre showtimes to a dated schedule")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the next few days of showtimes and write the schedule file
    Fetch {
        /// Theatre listing page
        #[arg(long, default_value = DEFAULT_THEATRE_URL)]
        base_url: String,
        /// Days to fetch, today included
        #[arg(short = 'n', long, default_value = "3")]
        days: u32,
        /// Seconds to wait for a date's listing to appear
        #[arg(long, default_value = "30")]
        wait_secs: u64,
        #[arg(short, long, default_value = "movie-data.json")]
        output: PathBuf,
    },
    /// List the dates in the schedule file
    Dates {
        #[arg(short, long, default_value = "movie-data.json")]
        store: PathBuf,
    },
    /// Movies and showtimes for one date
    Show {
        #[arg(short, long, default_value = "movie-data.json")]
        store: PathBuf,
        /// YYYY-MM-DD (default: first date in the file)
        #[arg(short, long)]
        date: Option<DateKey>,
    },
    /// Day view: every showing with its start and end
    Calendar {
        #[arg(short, long, default_value = "movie-data.json")]
        store: PathBuf,
        /// YYYY-MM-DD (default: first date in the file)
        #[arg(short, long)]
        date: Option<DateKey>,
    },
}

fn load(path: &Path) -> Result<ScheduleStore> {
    ScheduleStore::load(path).with_context(|| format!("reading {}", path.display()))
}

fn pick_date(store: &ScheduleStore, date: Option<DateKey>) -> Result<DateKey> {
    date.or_else(|| store.first_date())
        .context("schedule file has no dates; run `fetch` first")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            base_url,
            days,
            wait_secs,
            output,
        } => {
            let config = IngestConfig {
                base_url,
                days,
                wait_timeout: Duration::from_secs(wait_secs),
                output,
                ..IngestConfig::default()
            };
            let report = showtime_scrape::run(&config).await?;
            for (date, movies) in report.store.iter() {
                println!("{date}: {} movies", movies.len());
            }
            for (date, e) in &report.failures {
                println!("{date}: failed ({e})");
            }
            println!("Wrote {}", config.output.display());
        }
        Commands::Dates { store } => {
            for date in load(&store)?.dates() {
                println!("{date}");
            }
        }
        Commands::Show { store, date } => {
            let store = load(&store)?;
            let date = pick_date(&store, date)?;
            match store.get(&date) {
                None => println!("{date}: not yet ingested"),
                Some([]) => println!("{date}: no showings"),
                Some(movies) => {
                    for movie in movies {
                        println!("{} [{}] {}", movie.title, movie.rating, movie.duration);
                        if !movie.genres.is_empty() {
                            println!("  {}", movie.genres);
                        }
                        for screening in &movie.screenings {
                            println!("  {:<16} {}", screening.screen, screening.times.join("  "));
                        }
                        println!();
                    }
                }
            }
        }
        Commands::Calendar { store, date } => {
            let store = load(&store)?;
            let date = pick_date(&store, date)?;
            let Some(movies) = store.get(&date) else {
                println!("{date}: not yet ingested");
                return Ok(());
            };
            let view = DayView::default();
            for event in day_schedule(movies, date)
                .iter()
                .filter(|e| view.shows(e, date))
            {
                println!(
                    "{}-{} {} [{}]",
                    event.start.format("%H:%M"),
                    event.end.format("%H:%M"),
                    event.label,
                    event.movie.rating
                );
            }
        }
    }

    Ok(())
}
