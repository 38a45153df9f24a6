use super::objective::ObjectiveKind;
use crate::core::models::details::DangleModel;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Largest supported stencil half-width.
pub const MAX_HALF_WIDTH: usize = 100;

/// Largest number of temperatures a single sweep may emit.
pub const MAX_SWEEP_POINTS: usize = 10_000_000;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Resolves a dangle selector, falling back to double dangles for unsupported values.
pub fn resolve_dangles(selector: i64) -> DangleModel {
    DangleModel::from_selector(selector).unwrap_or_else(|| {
        warn!(
            selector,
            "Unsupported dangle model, falling back to {}",
            DangleModel::Double.selector()
        );
        DangleModel::Double
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCapacityConfig {
    /// Lowest emitted temperature in °C.
    pub t_min: f64,
    /// Highest emitted temperature in °C.
    pub t_max: f64,
    /// Temperature increment in °C.
    pub step: f64,
    /// Half-width `m` of the `2m + 1` point stencil.
    pub half_width: usize,
}

impl HeatCapacityConfig {
    pub fn window_size(&self) -> usize {
        2 * self.half_width + 1
    }

    /// Number of points a sweep emits, saturating at `usize::MAX`.
    pub fn point_count(&self) -> usize {
        let intervals = sweep_intervals(self.t_min, self.t_max, self.step).max(0.0);
        (intervals as usize).saturating_add(1)
    }
}

fn sweep_intervals(t_min: f64, t_max: f64, step: f64) -> f64 {
    ((t_max - t_min) / step + 1e-9).floor()
}

#[derive(Default)]
pub struct HeatCapacityConfigBuilder {
    t_min: Option<f64>,
    t_max: Option<f64>,
    step: Option<f64>,
    half_width: Option<usize>,
}

impl HeatCapacityConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn t_min(mut self, celsius: f64) -> Self {
        self.t_min = Some(celsius);
        self
    }
    pub fn t_max(mut self, celsius: f64) -> Self {
        self.t_max = Some(celsius);
        self
    }
    pub fn step(mut self, celsius: f64) -> Self {
        self.step = Some(celsius);
        self
    }
    pub fn half_width(mut self, m: usize) -> Self {
        self.half_width = Some(m);
        self
    }

    pub fn build(self) -> Result<HeatCapacityConfig, ConfigError> {
        let t_min = self.t_min.ok_or(ConfigError::MissingParameter("t_min"))?;
        let t_max = self.t_max.ok_or(ConfigError::MissingParameter("t_max"))?;
        let step = self.step.ok_or(ConfigError::MissingParameter("step"))?;
        let half_width = self
            .half_width
            .ok_or(ConfigError::MissingParameter("half_width"))?;

        if !t_min.is_finite() || !t_max.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "t_min/t_max",
                reason: "temperature bounds must be finite".to_string(),
            });
        }
        if t_max < t_min {
            return Err(ConfigError::InvalidParameter {
                name: "t_max",
                reason: format!("{} is below t_min {}", t_max, t_min),
            });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "step",
                reason: format!("must be positive, got {}", step),
            });
        }
        let intervals = sweep_intervals(t_min, t_max, step);
        if !intervals.is_finite() || intervals >= MAX_SWEEP_POINTS as f64 {
            return Err(ConfigError::InvalidParameter {
                name: "step",
                reason: format!(
                    "range {}..{} in steps of {} exceeds {} points",
                    t_min, t_max, step, MAX_SWEEP_POINTS
                ),
            });
        }
        if half_width == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "half_width",
                reason: "must be at least 1".to_string(),
            });
        }
        let half_width = if half_width > MAX_HALF_WIDTH {
            warn!(
                requested = half_width,
                "Stencil half-width clamped to {}", MAX_HALF_WIDTH
            );
            MAX_HALF_WIDTH
        } else {
            half_width
        };

        Ok(HeatCapacityConfig {
            t_min,
            t_max,
            step,
            half_width,
        })
    }
}

/// Backtracking line-search settings of the perturbation optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchConfig {
    /// Length of the first trial step along the normalized gradient.
    pub initial_step_length: f64,
    /// Trial steps shorter than this end the search.
    pub min_step_size: f64,
    /// Relative score improvement a step must reach to be accepted without further halving.
    pub min_improvement: f64,
}

impl Default for LineSearchConfig {
    fn default() -> Self {
        Self {
            initial_step_length: 0.5,
            min_step_size: 1e-15,
            min_improvement: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationConfig {
    /// Weight of the objective-specific penalty on the vector.
    pub sigma: f64,
    /// Weight of the quadratic penalty on the vector.
    pub tau: f64,
    pub objective: ObjectiveKind,
    /// Structures sampled per evaluation; 0 evaluates pairing statistics exactly.
    pub sample_size: usize,
    pub max_iterations: usize,
    pub line_search: LineSearchConfig,
    pub seed: Option<u64>,
    /// Reactivities below the cutoff are classified as paired.
    pub cutoff: f64,
    /// Checkpoints are written to `<prefix>_<iteration>` when set.
    pub checkpoint_prefix: Option<PathBuf>,
}

#[derive(Default)]
pub struct PerturbationConfigBuilder {
    sigma: Option<f64>,
    tau: Option<f64>,
    objective: Option<ObjectiveKind>,
    sample_size: Option<usize>,
    max_iterations: Option<usize>,
    line_search: Option<LineSearchConfig>,
    seed: Option<u64>,
    cutoff: Option<f64>,
    checkpoint_prefix: Option<PathBuf>,
}

impl PerturbationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }
    pub fn tau(mut self, tau: f64) -> Self {
        self.tau = Some(tau);
        self
    }
    pub fn objective(mut self, kind: ObjectiveKind) -> Self {
        self.objective = Some(kind);
        self
    }
    /// Numeric objective selector; unknown selectors fall back to the quadratic objective.
    pub fn objective_selector(mut self, selector: i64) -> Self {
        self.objective = Some(ObjectiveKind::from_selector(selector).unwrap_or_else(|| {
            warn!(
                selector,
                "Unknown objective function, falling back to {}",
                ObjectiveKind::Quadratic.selector()
            );
            ObjectiveKind::Quadratic
        }));
        self
    }
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn line_search(mut self, line_search: LineSearchConfig) -> Self {
        self.line_search = Some(line_search);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn checkpoint_prefix(mut self, prefix: PathBuf) -> Self {
        self.checkpoint_prefix = Some(prefix);
        self
    }

    pub fn build(self) -> Result<PerturbationConfig, ConfigError> {
        let sigma = self.sigma.ok_or(ConfigError::MissingParameter("sigma"))?;
        let tau = self.tau.ok_or(ConfigError::MissingParameter("tau"))?;
        let objective = self
            .objective
            .ok_or(ConfigError::MissingParameter("objective"))?;
        let sample_size = self
            .sample_size
            .ok_or(ConfigError::MissingParameter("sample_size"))?;
        let cutoff = self.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?;

        for (name, value) in [("sigma", sigma), ("tau", tau)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        if !cutoff.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "cutoff",
                reason: format!("must be finite, got {}", cutoff),
            });
        }
        let line_search = self.line_search.unwrap_or_default();
        if !(line_search.initial_step_length > 0.0 && line_search.min_step_size > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "line_search",
                reason: "step lengths must be positive".to_string(),
            });
        }

        Ok(PerturbationConfig {
            sigma,
            tau,
            objective,
            sample_size,
            max_iterations: self.max_iterations.unwrap_or(100),
            line_search,
            seed: self.seed,
            cutoff,
            checkpoint_prefix: self.checkpoint_prefix,
        })
    }
}
