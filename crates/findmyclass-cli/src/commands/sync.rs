//! Sync subcommand.
//!
//! Runs one gated sync against the configured Google calendar and prints
//! the resulting overlay.

use chrono::NaiveDate;
use findmyclass_core::{
    Config, FetchWindow, GoogleCalendarProvider, GridLayout, KeyringStore, ScheduleSync,
    SessionStore,
};

use super::grid::render_text;

pub fn run(week: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let week = week
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| format!("invalid --week '{date}': {e} (expected YYYY-MM-DD)"))
        })
        .transpose()?;

    let config = Config::load()?;
    let layout = config.grid.layout()?;
    // Week boundaries follow the grid zone.
    let window = match week {
        Some(date) => FetchWindow::week_of(date, layout.zone),
        None => FetchWindow::this_week(layout.zone),
    };
    let provider = GoogleCalendarProvider::new(&config.calendar)?;
    let session = SessionStore::open()?;

    let mut engine =
        ScheduleSync::new(provider, KeyringStore::new(), session, layout).with_window(window);

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(engine.request_sync())?;
    let overlay = engine.overlay();

    if json {
        let out = serde_json::json!({
            "window": engine.window(),
            "report": report,
            "overlay": overlay,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Week of {}: {} events, {} on the grid",
            week_start(&window, &layout).format("%Y-%m-%d"),
            report.event_count,
            report.placed_count
        );
        print!("{}", render_text(&layout, &layout.render_grid(), &overlay));
    }

    engine.acknowledge();
    Ok(())
}

/// Monday of the fetched week as shown on the grid.
fn week_start(window: &FetchWindow, layout: &GridLayout) -> NaiveDate {
    match layout.zone {
        Some(tz) => window.time_min.with_timezone(&tz).date_naive(),
        None => window.time_min.date_naive(),
    }
}
