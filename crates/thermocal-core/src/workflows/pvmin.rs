use crate::core::fold::{FoldingEngine, RnaFolder};
use crate::core::io::probing::ProbingData;
use crate::core::io::writers::write_checkpoint_to_path;
use crate::core::models::details::ModelDetails;
use crate::core::models::perturbation::{PerturbationVector, TargetClassification};
use crate::core::models::sequence::Sequence;
use crate::engine::config::PerturbationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use crate::engine::tasks::perturbation::OptimizationOutcome;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct PvminResult {
    pub targets: TargetClassification,
    pub epsilon: PerturbationVector,
    pub outcome: OptimizationOutcome,
}

/// Infers the perturbation vector that reconciles `sequence` with probing reactivities,
/// using the reference folding engine.
#[instrument(skip_all, name = "pvmin_workflow", fields(length = sequence.len()))]
pub fn run(
    sequence: &Sequence,
    details: &ModelDetails,
    probing: &ProbingData,
    config: &PerturbationConfig,
    reporter: &ProgressReporter,
) -> Result<PvminResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let mut engine = RnaFolder::new(sequence.clone(), details)?;
    reporter.report(Progress::PhaseFinish);

    run_with_engine(&mut engine, details, probing, config, reporter)
}

/// Same as [`run`], driving a caller-supplied engine.
///
/// Checkpoints are best effort: a failed write is logged and the search continues.
pub fn run_with_engine<E>(
    engine: &mut E,
    details: &ModelDetails,
    probing: &ProbingData,
    config: &PerturbationConfig,
    reporter: &ProgressReporter,
) -> Result<PvminResult, EngineError>
where
    E: FoldingEngine + ?Sized,
{
    let sequence = engine.sequence().clone();
    if probing.len() != sequence.len() {
        return Err(EngineError::LengthMismatch {
            what: "probing data",
            expected: sequence.len(),
            found: probing.len(),
        });
    }

    let targets = probing.classify(config.cutoff);
    let unpaired_targets = targets.classes().iter().filter(|&&c| c == 1).count();
    info!(
        cutoff = config.cutoff,
        unpaired_targets,
        "Classified probing data."
    );

    reporter.report(Progress::PhaseStart {
        name: "Perturbation Search",
    });
    let mut epsilon = PerturbationVector::zeros(sequence.len());
    let outcome = tasks::perturbation::run(
        engine,
        details,
        &targets,
        config,
        &mut epsilon,
        reporter,
        |record| {
            let Some(prefix) = &config.checkpoint_prefix else {
                return;
            };
            match write_checkpoint_to_path(
                prefix,
                record.iteration,
                record.score,
                &sequence,
                &record.epsilon,
            ) {
                Ok(path) => debug!(path = %path.display(), "Checkpoint written"),
                Err(e) => warn!(
                    iteration = record.iteration,
                    "Could not write checkpoint: {}", e
                ),
            }
        },
    )?;
    reporter.report(Progress::PhaseFinish);

    Ok(PvminResult {
        targets,
        epsilon,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PerturbationConfigBuilder;
    use crate::engine::objective::ObjectiveKind;
    use std::fs;
    use tempfile::tempdir;

    fn config(prefix: Option<std::path::PathBuf>) -> PerturbationConfig {
        let mut builder = PerturbationConfigBuilder::new()
            .sigma(1.0)
            .tau(1.0)
            .objective(ObjectiveKind::Quadratic)
            .sample_size(0)
            .cutoff(0.5)
            .max_iterations(3)
            .seed(3);
        if let Some(prefix) = prefix {
            builder = builder.checkpoint_prefix(prefix);
        }
        builder.build().unwrap()
    }

    #[test]
    fn writes_one_checkpoint_per_iteration() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("vector");
        let sequence = Sequence::new("GGGAAACCC").unwrap();
        let probing =
            ProbingData::from_reactivities(vec![0.9, 0.1, 0.1, 0.9, 0.9, 0.9, 0.1, 0.1, 0.9]);
        let result = run(
            &sequence,
            &ModelDetails::default(),
            &probing,
            &config(Some(prefix.clone())),
            &ProgressReporter::new(),
        )
        .unwrap();

        let first = fs::read_to_string(dir.path().join("vector_0000")).unwrap();
        assert!(first.starts_with("#iteration 0\n#score "));
        assert_eq!(first.lines().count(), 2 + 9);
        for iteration in 0..=result.outcome.iterations {
            assert!(dir.path().join(format!("vector_{:04}", iteration)).exists());
        }
    }

    #[test]
    fn unwritable_checkpoint_location_does_not_abort_the_search() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("missing").join("vector");
        let sequence = Sequence::new("GGGAAACCC").unwrap();
        let probing = ProbingData::from_reactivities(vec![0.0; 9]);
        let result = run(
            &sequence,
            &ModelDetails::default(),
            &probing,
            &config(Some(prefix)),
            &ProgressReporter::new(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn probing_data_of_wrong_length_is_rejected() {
        let sequence = Sequence::new("GGGAAACCC").unwrap();
        let probing = ProbingData::from_reactivities(vec![0.0; 4]);
        let result = run(
            &sequence,
            &ModelDetails::default(),
            &probing,
            &config(None),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::LengthMismatch {
                what: "probing data",
                ..
            })
        ));
    }
}
