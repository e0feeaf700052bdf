//! `phoenixbad fetch`: one poll cycle, printed once.

use tracing::warn;

use phoenixbad_core::Coordinator;

use crate::cli::{FetchArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::render_views;

pub async fn handle(args: &FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let poller = config::poller_config(&cfg, global, &args.area, None)?;
    let format = config::output_format(global, &cfg);
    let color = output::should_color(config::color_mode(global, &cfg));

    let (views, result) =
        Coordinator::oneshot(poller, |coordinator, result| (coordinator.views(), result)).await?;

    // Per-area errors are part of the table, so print before failing.
    output::print_output(&render_views(&views, format, color)?, global.quiet);

    let outcome = result?;
    for (area, failure) in outcome.failures() {
        warn!(%area, error = %failure.message, "area unavailable");
    }
    Ok(())
}
