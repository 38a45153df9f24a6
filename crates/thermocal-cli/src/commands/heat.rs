use super::{build_engine, read_sequence};
use crate::cli::HeatArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use std::io::{self, Write};
use thermocal::engine::progress::ProgressReporter;
use thermocal::workflows;
use tracing::info;

pub fn run(args: HeatArgs, file_config: FileConfig, show_progress: bool) -> Result<()> {
    let settings = config::heat_settings(&args, file_config)?;
    let sequence = read_sequence(args.sequence.as_deref(), settings.model.convert_dna)?;
    info!(
        "Computing specific heat of a {}-nt sequence from {} to {} °C.",
        sequence.len(),
        settings.sweep.t_min,
        settings.sweep.t_max
    );

    let mut engine = build_engine(&sequence, &settings.model)?;
    let mut details = settings.model.details.clone();

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let points = workflows::heat::run_with_engine(
        &mut engine,
        &mut details,
        &settings.sweep,
        &reporter,
        &mut out,
    )?;
    out.flush()?;

    info!("Wrote {} heat-capacity point(s).", points.len());
    Ok(())
}
