use super::{build_engine, read_sequence};
use crate::cli::PvminArgs;
use crate::config::{self, FileConfig};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use std::io::{self, Write};
use thermocal::core::io::probing::ProbingData;
use thermocal::core::io::writers::write_perturbation_vector;
use thermocal::engine::error::EngineError;
use thermocal::engine::progress::ProgressReporter;
use thermocal::workflows;
use tracing::{info, warn};

pub fn run(args: PvminArgs, file_config: FileConfig, show_progress: bool) -> Result<()> {
    let settings = config::pvmin_settings(&args, file_config)?;
    let sequence = read_sequence(args.sequence.as_deref(), settings.model.convert_dna)?;

    info!("Reading probing data from {:?}", &args.probing_file);
    let probing =
        ProbingData::read_from_path(&args.probing_file, &sequence).map_err(EngineError::from)?;

    let mut engine = build_engine(&sequence, &settings.model)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = workflows::pvmin::run_with_engine(
        &mut engine,
        &settings.model.details,
        &probing,
        &settings.search,
        &reporter,
    )?;

    if result.outcome.converged {
        info!(
            "Search converged after {} iteration(s) with score {:.6}.",
            result.outcome.iterations, result.outcome.score
        );
    } else {
        warn!(
            "Search stopped at the iteration cap ({}) with score {:.6}.",
            result.outcome.iterations, result.outcome.score
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_perturbation_vector(&mut out, &sequence, &result.epsilon)?;
    out.flush()?;
    Ok(())
}
