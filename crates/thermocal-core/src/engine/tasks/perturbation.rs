use crate::core::fold::{FoldingEngine, FoldingError};
use crate::core::models::details::ModelDetails;
use crate::core::models::perturbation::{PerturbationVector, TargetClassification};
use crate::engine::config::PerturbationConfig;
use crate::engine::error::EngineError;
use crate::engine::objective::Objective;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::statistics::PairingStatistics;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, instrument, trace};

/// Scores at or below this value count as a perfect fit.
const SCORE_TOLERANCE: f64 = 1e-12;

/// Snapshot handed to the iteration observer.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub score: f64,
    pub epsilon: PerturbationVector,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationOutcome {
    /// Number of accepted descent steps.
    pub iterations: usize,
    pub score: f64,
    /// `false` when the iteration cap ended the search.
    pub converged: bool,
}

fn evaluate<E>(
    engine: &E,
    epsilon: &PerturbationVector,
    sample_size: usize,
    rng: &mut dyn RngCore,
) -> Result<PairingStatistics, FoldingError>
where
    E: FoldingEngine + ?Sized,
{
    if sample_size == 0 {
        PairingStatistics::exact(engine, epsilon)
    } else {
        PairingStatistics::sampled(engine, epsilon, sample_size, rng)
    }
}

/// Calibrates `epsilon` in place against the classified targets.
///
/// The engine is prepared by applying `details` and rescaling around the unperturbed
/// minimum free energy. Each iteration scores the current vector, reports it to
/// `on_iteration`, and takes one backtracking step along the normalized gradient. The search
/// stops on a perfect fit, when a step fails to improve the score, when the relative
/// improvement drops below the configured threshold, or at the iteration cap.
#[instrument(skip_all, name = "perturbation_task", fields(objective = ?config.objective, sigma = config.sigma, tau = config.tau))]
pub fn run<E, F>(
    engine: &mut E,
    details: &ModelDetails,
    targets: &TargetClassification,
    config: &PerturbationConfig,
    epsilon: &mut PerturbationVector,
    reporter: &ProgressReporter,
    mut on_iteration: F,
) -> Result<OptimizationOutcome, EngineError>
where
    E: FoldingEngine + ?Sized,
    F: FnMut(&IterationRecord),
{
    let length = engine.sequence().len();
    if targets.len() != length {
        return Err(EngineError::LengthMismatch {
            what: "target classification",
            expected: length,
            found: targets.len(),
        });
    }
    if epsilon.len() != length {
        return Err(EngineError::LengthMismatch {
            what: "perturbation vector",
            expected: length,
            found: epsilon.len(),
        });
    }

    engine.apply_model_details(details)?;
    let mfe = engine.minimum_free_energy()?;
    if !mfe.is_finite() {
        return Err(EngineError::NonFiniteEnergy {
            temperature: details.temperature,
            value: mfe,
        });
    }
    engine.rescale(mfe);
    let engine = &*engine;
    let kt = details.thermal_energy();
    debug!(mfe, kt, "Prepared engine for perturbation search");

    let objective = Objective::new(config.objective, config.sigma, config.tau);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let search = &config.line_search;

    let mut statistics = evaluate(engine, epsilon, config.sample_size, &mut rng)?;
    let mut score = objective.score(statistics.unpaired(), targets, epsilon);
    let mut iteration = 0;
    let mut last_improvement = f64::INFINITY;
    let converged;

    info!(
        length,
        sample_size = config.sample_size,
        "Starting perturbation vector search."
    );

    loop {
        if !score.is_finite() {
            return Err(EngineError::NonFiniteScore { iteration });
        }
        on_iteration(&IterationRecord {
            iteration,
            score,
            epsilon: epsilon.clone(),
        });
        reporter.report(Progress::Iteration { iteration, score });
        info!("Iteration: {}\t Score: {}", iteration, score);

        if score <= SCORE_TOLERANCE || last_improvement < search.min_improvement {
            converged = true;
            break;
        }
        if iteration >= config.max_iterations {
            converged = false;
            break;
        }

        let gradient = objective.gradient(&statistics, targets, epsilon, kt);
        let norm = gradient.iter().map(|g| g * g).sum::<f64>().sqrt();
        if !norm.is_finite() {
            return Err(EngineError::NonFiniteScore { iteration });
        }
        if norm == 0.0 {
            converged = true;
            break;
        }
        let direction: Vec<f64> = gradient.iter().map(|g| g / norm).collect();

        let mut step = search.initial_step_length;
        let (candidate, candidate_statistics, candidate_score) = loop {
            let candidate = epsilon.stepped(&direction, step);
            let candidate_statistics =
                evaluate(engine, &candidate, config.sample_size, &mut rng)?;
            let candidate_score =
                objective.score(candidate_statistics.unpaired(), targets, &candidate);
            if !candidate_score.is_finite() {
                return Err(EngineError::NonFiniteScore {
                    iteration: iteration + 1,
                });
            }
            let improvement = 1.0 - candidate_score / score;
            trace!(step, candidate_score, improvement, "Line search trial");
            if improvement >= search.min_improvement || step / 2.0 < search.min_step_size {
                break (candidate, candidate_statistics, candidate_score);
            }
            step /= 2.0;
        };

        if candidate_score > score {
            debug!(
                score,
                candidate_score, "Line search found no descent; stopping."
            );
            converged = true;
            break;
        }

        last_improvement = 1.0 - candidate_score / score;
        *epsilon = candidate;
        statistics = candidate_statistics;
        score = candidate_score;
        iteration += 1;
    }

    info!(iteration, score, converged, "Perturbation vector search finished.");
    reporter.message(format!(
        "{} objective {} after {} iterations (score {:.6})",
        objective.kind.strategy().name(),
        if converged { "converged" } else { "stopped" },
        iteration,
        score
    ));
    Ok(OptimizationOutcome {
        iterations: iteration,
        score,
        converged,
    })
}
