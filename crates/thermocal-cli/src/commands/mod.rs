pub mod heat;
pub mod pvmin;

use crate::config::ModelSettings;
use crate::error::{CliError, Result};
use std::io::{self, BufRead};
use thermocal::core::fold::RnaFolder;
use thermocal::core::fold::params::EnergyParameters;
use thermocal::core::models::sequence::Sequence;
use thermocal::engine::error::EngineError;
use tracing::{debug, info};

/// Resolves the input sequence from the command line, or from the first record on stdin.
pub fn read_sequence(inline: Option<&str>, convert_dna: bool) -> Result<Sequence> {
    let raw = match inline {
        Some(raw) => raw.to_string(),
        None => {
            debug!("No sequence given on the command line, reading standard input.");
            read_record(&mut io::stdin().lock())?
        }
    };
    Sequence::with_conversion(&raw, convert_dna).map_err(|e| EngineError::from(e).into())
}

/// Reads one sequence record: an optional `>` header followed by sequence lines up to the
/// next blank line or header. Lines starting with `#` are ignored.
fn read_record(reader: &mut impl BufRead) -> Result<String> {
    let mut sequence = String::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with('>') || trimmed.is_empty() {
            if sequence.is_empty() {
                continue;
            }
            break;
        }
        sequence.push_str(trimmed);
    }
    if sequence.is_empty() {
        return Err(CliError::Input("no sequence found on standard input".to_string()));
    }
    Ok(sequence)
}

/// Builds the reference folding engine, loading a custom parameter set when configured.
pub fn build_engine(sequence: &Sequence, model: &ModelSettings) -> Result<RnaFolder> {
    let parameters = match &model.parameter_file {
        Some(path) => {
            info!("Loading energy parameters from {:?}", path);
            EnergyParameters::load(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?
        }
        None => EnergyParameters::default(),
    };
    RnaFolder::with_parameters(sequence.clone(), parameters, &model.details)
        .map_err(|e| EngineError::from(e).into())
}
