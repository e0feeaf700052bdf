//! Subcommand handlers and the shared per-area table.

pub mod config_cmd;
pub mod fetch;
pub mod parse;
pub mod watch;

use chrono::Local;
use tabled::Tabled;

use phoenixbad_core::{AreaView, OccupancyReading, ResponseShape};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AreaRow {
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Free")]
    free: String,
    #[tabled(rename = "Occupied")]
    occupied: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Occupancy")]
    occupancy: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Last error")]
    error: String,
}

impl AreaRow {
    fn from_view(view: &AreaView, color: bool) -> Self {
        let dash = || "-".to_owned();
        let r = view.reading.as_ref();
        Self {
            area: view.area.to_string(),
            status: output::freshness_label(view.freshness, color),
            free: r.map_or_else(dash, free_label),
            occupied: r.map_or_else(dash, |r| r.occupied().to_string()),
            total: r.map_or_else(dash, |r| r.total().to_string()),
            occupancy: r.map_or_else(dash, percentage_label),
            updated: view.last_updated_at.map_or_else(dash, |at| {
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
            }),
            error: view
                .last_error
                .as_ref()
                .map_or_else(String::new, |e| e.message.clone()),
        }
    }
}

// ── Shared formatting ───────────────────────────────────────────────

/// Free count, or `?` when the source did not report one.
pub(crate) fn free_label(reading: &OccupancyReading) -> String {
    if reading.free_known() {
        reading.free().to_string()
    } else {
        "?".into()
    }
}

/// Percentage with one decimal; `~` marks an approximate occupied count.
pub(crate) fn percentage_label(reading: &OccupancyReading) -> String {
    let approx = if reading.is_approximate() { "~" } else { "" };
    format!("{approx}{:.1}%", reading.percentage())
}

pub(crate) fn shape_label(shape: ResponseShape) -> &'static str {
    match shape {
        ResponseShape::BareInteger => "bare integer",
        ResponseShape::LegacyMarkup => "legacy markup",
        ResponseShape::Widget => "widget",
    }
}

/// `area freshness free occupied total percentage`, `-` for unknown values.
fn plain_line(view: &AreaView) -> String {
    match view.reading.as_ref() {
        Some(r) => format!(
            "{} {} {} {} {} {:.1}",
            view.area,
            view.freshness,
            free_label(r),
            r.occupied(),
            r.total(),
            r.percentage()
        ),
        None => format!("{} {} - - - -", view.area, view.freshness),
    }
}

/// Render every area view in the chosen format.
pub(crate) fn render_views(
    views: &[AreaView],
    format: OutputFormat,
    color: bool,
) -> Result<String, CliError> {
    output::render_list(format, views, |v| AreaRow::from_view(v, color), plain_line)
}
