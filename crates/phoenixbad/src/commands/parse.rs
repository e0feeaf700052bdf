//! `phoenixbad parse`: classify and normalize a saved response body.

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use phoenixbad_core::{Area, OccupancyReading, parse_reading};

use crate::cli::{GlobalOpts, ParseArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{free_label, percentage_label, shape_label};

#[derive(Serialize)]
struct ParsedBody {
    area: Area,
    #[serde(flatten)]
    reading: OccupancyReading,
}

fn read_body(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn detail(parsed: &ParsedBody) -> String {
    let r = &parsed.reading;
    [
        format!("Area:       {}", parsed.area),
        format!("Format:     {}", shape_label(r.shape())),
        format!("Free:       {}", free_label(r)),
        format!("Occupied:   {}", r.occupied()),
        format!("Total:      {}", r.total()),
        format!("Occupancy:  {}", percentage_label(r)),
    ]
    .join("\n")
}

fn line(parsed: &ParsedBody) -> String {
    let r = &parsed.reading;
    format!(
        "{} {} {} {} {:.1}",
        parsed.area,
        free_label(r),
        r.occupied(),
        r.total(),
        r.percentage()
    )
}

pub fn handle(args: &ParseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let body = read_body(&args.file)?;
    let area = Area::from(args.area);
    debug!(%area, bytes = body.len(), "parsing saved body");

    let reading = parse_reading(&body, area)?;
    let parsed = ParsedBody { area, reading };

    // Offline: a broken config file must not stop this command.
    let cfg = config::load(global).unwrap_or_default();
    let format = config::output_format(global, &cfg);
    let out = output::render_single(format, &parsed, detail, line)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
