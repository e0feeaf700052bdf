//! `phoenixbad watch`: run the coordinator and print every applied cycle.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use phoenixbad_core::Coordinator;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::render_views;

pub async fn handle(args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let poller = config::poller_config(&cfg, global, &args.area, args.interval)?;
    let format = config::output_format(global, &cfg);
    let color = output::should_color(config::color_mode(global, &cfg));

    let coordinator = Coordinator::new(poller)?;
    let updates = coordinator.subscribe();
    coordinator.start().await?;
    info!(
        interval = %humantime::format_duration(coordinator.interval()),
        "watching, press Ctrl+C to stop"
    );

    let result = print_cycles(&coordinator, updates, args.cycles, format, color, global.quiet).await;
    coordinator.shutdown().await;
    result
}

async fn print_cycles(
    coordinator: &Coordinator,
    mut updates: watch::Receiver<u64>,
    max_cycles: Option<u64>,
    format: OutputFormat,
    color: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut printed = 0_u64;
    loop {
        tokio::select! {
            biased;
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                }
                debug!("interrupted");
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let out = render_views(&coordinator.views(), format, color)?;
                output::print_output(&out, quiet);
                printed += 1;
                if max_cycles.is_some_and(|n| printed >= n) {
                    return Ok(());
                }
            }
        }
    }
}
