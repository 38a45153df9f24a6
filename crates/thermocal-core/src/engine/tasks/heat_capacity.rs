use crate::core::fold::FoldingEngine;
use crate::core::models::details::{K0, ModelDetails};
use crate::core::numeric::stencil::second_derivative;
use crate::engine::config::HeatCapacityConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::window::FreeEnergyWindow;
use tracing::{debug, info, instrument, trace};

/// Per-nucleotide, per-degree shift applied to the previous ensemble free energy when
/// estimating the rescaling reference of the next temperature, in kcal/mol.
pub const RESCALE_SLOPE: f64 = 0.00727;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatCapacityPoint {
    /// Window-center temperature in °C.
    pub temperature: f64,
    /// Specific heat in kcal/(mol·K).
    pub heat_capacity: f64,
}

/// Lazily evaluated heat-capacity curve.
///
/// Creating the sweep evaluates the first `2m + 1` ensemble free energies; every call to
/// `next` emits the point at the current window center and then slides the window by one
/// temperature step. The caller's [`ModelDetails`] follow the working temperature and are
/// re-applied to the engine at every step.
pub struct HeatCapacitySweep<'a, E: FoldingEngine + ?Sized> {
    engine: &'a mut E,
    details: &'a mut ModelDetails,
    config: HeatCapacityConfig,
    window: FreeEnergyWindow,
    start: f64,
    next_sample: usize,
    emitted: usize,
    total: usize,
    failed: bool,
}

impl<'a, E: FoldingEngine + ?Sized> HeatCapacitySweep<'a, E> {
    pub fn new(
        engine: &'a mut E,
        details: &'a mut ModelDetails,
        config: &HeatCapacityConfig,
    ) -> Result<Self, EngineError> {
        let start = config.t_min - config.half_width as f64 * config.step;
        details.rescaling_factor = 1.0;
        details.temperature = start;
        engine.apply_model_details(details)?;

        let mfe = engine.minimum_free_energy()?;
        if !mfe.is_finite() {
            return Err(EngineError::NonFiniteEnergy {
                temperature: start,
                value: mfe,
            });
        }
        engine.rescale(mfe);
        debug!(temperature = start, mfe, "Initial rescaling reference");

        let mut sweep = Self {
            engine,
            details,
            config: config.clone(),
            window: FreeEnergyWindow::for_half_width(config.half_width),
            start,
            next_sample: 0,
            emitted: 0,
            total: config.point_count(),
            failed: false,
        };
        while !sweep.window.is_full() {
            sweep.advance()?;
        }
        Ok(sweep)
    }

    /// Number of points still to be emitted.
    pub fn remaining(&self) -> usize {
        if self.failed {
            0
        } else {
            self.total - self.emitted
        }
    }

    #[inline]
    fn sample_temperature(&self, index: usize) -> f64 {
        self.start + index as f64 * self.config.step
    }

    /// Samples the ensemble free energy at the working temperature, then moves to the next
    /// temperature and rescales around the extrapolated free energy.
    fn advance(&mut self) -> Result<(), EngineError> {
        let temperature = self.details.temperature;
        let energy = self.engine.ensemble_free_energy()?;
        if !energy.is_finite() {
            return Err(EngineError::NonFiniteEnergy {
                temperature,
                value: energy,
            });
        }
        trace!(temperature, energy, "Ensemble free energy sample");
        self.window.push(energy);

        self.next_sample += 1;
        self.details.temperature = self.sample_temperature(self.next_sample);
        self.engine.apply_model_details(self.details)?;
        let length = self.engine.sequence().len() as f64;
        self.engine
            .rescale(energy + self.config.step * RESCALE_SLOPE * length);
        Ok(())
    }

    fn emit(&mut self) -> Result<HeatCapacityPoint, EngineError> {
        let d2 = second_derivative(
            self.window.iter(),
            self.config.step,
            self.config.half_width,
        )?;
        let temperature = self.sample_temperature(self.emitted + self.config.half_width);
        let heat_capacity = -d2 * (temperature + K0);
        self.emitted += 1;
        if self.emitted < self.total {
            self.advance()?;
        }
        Ok(HeatCapacityPoint {
            temperature,
            heat_capacity,
        })
    }
}

impl<E: FoldingEngine + ?Sized> Iterator for HeatCapacitySweep<'_, E> {
    type Item = Result<HeatCapacityPoint, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        let result = self.emit();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Runs a full sweep, handing each point to `on_point` as soon as it is computed.
#[instrument(skip_all, name = "heat_capacity_task", fields(t_min = config.t_min, t_max = config.t_max, step = config.step, m = config.half_width))]
pub fn run<E, F>(
    engine: &mut E,
    details: &mut ModelDetails,
    config: &HeatCapacityConfig,
    reporter: &ProgressReporter,
    mut on_point: F,
) -> Result<Vec<HeatCapacityPoint>, EngineError>
where
    E: FoldingEngine + ?Sized,
    F: FnMut(&HeatCapacityPoint) -> Result<(), EngineError>,
{
    info!(
        points = config.point_count(),
        window = config.window_size(),
        "Starting heat-capacity sweep."
    );
    reporter.report(Progress::TaskStart {
        total_steps: config.point_count() as u64,
    });

    let sweep = HeatCapacitySweep::new(engine, details, config)?;
    let mut points = Vec::new();
    for point in sweep {
        let point = point?;
        debug!(
            temperature = point.temperature,
            heat_capacity = point.heat_capacity,
            "Heat capacity evaluated"
        );
        on_point(&point)?;
        points.push(point);
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    info!(points = points.len(), "Heat-capacity sweep complete.");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fold::FoldingError;
    use crate::core::models::perturbation::PerturbationVector;
    use crate::core::models::sequence::Sequence;
    use crate::engine::config::HeatCapacityConfigBuilder;
    use rand::RngCore;

    /// Engine whose ensemble free energy is a fixed function of temperature.
    struct CurveEngine {
        sequence: Sequence,
        temperature: f64,
        curve: fn(f64) -> f64,
        temperatures_seen: Vec<f64>,
        references: Vec<f64>,
    }

    impl CurveEngine {
        fn new(curve: fn(f64) -> f64) -> Self {
            Self {
                sequence: Sequence::new("GGGAAACCC").unwrap(),
                temperature: f64::NAN,
                curve,
                temperatures_seen: Vec::new(),
                references: Vec::new(),
            }
        }
    }

    impl FoldingEngine for CurveEngine {
        fn sequence(&self) -> &Sequence {
            &self.sequence
        }
        fn apply_model_details(&mut self, details: &ModelDetails) -> Result<(), FoldingError> {
            self.temperature = details.temperature;
            self.temperatures_seen.push(details.temperature);
            Ok(())
        }
        fn rescale(&mut self, reference_energy: f64) {
            self.references.push(reference_energy);
        }
        fn minimum_free_energy(&self) -> Result<f64, FoldingError> {
            Ok((self.curve)(self.temperature) - 1.0)
        }
        fn ensemble_free_energy(&self) -> Result<f64, FoldingError> {
            Ok((self.curve)(self.temperature))
        }
        fn unpaired_probabilities(
            &self,
            _bias: &PerturbationVector,
            _forced_unpaired: Option<usize>,
        ) -> Result<Vec<f64>, FoldingError> {
            Ok(vec![1.0; self.sequence.len()])
        }
        fn sample_structures(
            &self,
            _bias: &PerturbationVector,
            _count: usize,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<String>, FoldingError> {
            Ok(Vec::new())
        }
    }

    fn config(t_min: f64, t_max: f64, step: f64, m: usize) -> HeatCapacityConfig {
        HeatCapacityConfigBuilder::new()
            .t_min(t_min)
            .t_max(t_max)
            .step(step)
            .half_width(m)
            .build()
            .unwrap()
    }

    #[test]
    fn constant_free_energy_gives_zero_heat_capacity() {
        let mut engine = CurveEngine::new(|_| -5.0);
        let mut details = ModelDetails::default();
        let points = run(
            &mut engine,
            &mut details,
            &config(0.0, 10.0, 1.0, 2),
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(points.len(), 11);
        assert!(points.iter().all(|p| p.heat_capacity.abs() < 1e-9));
    }

    #[test]
    fn quadratic_free_energy_gives_linear_heat_capacity() {
        // G(T) = -0.01 T^2  =>  C = 0.02 (T + K0)
        let mut engine = CurveEngine::new(|t| -0.01 * t * t);
        let mut details = ModelDetails::default();
        let points = run(
            &mut engine,
            &mut details,
            &config(20.0, 40.0, 2.0, 3),
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        for p in points {
            let expected = 0.02 * (p.temperature + K0);
            assert!((p.heat_capacity - expected).abs() < 1e-6 * expected);
        }
    }

    #[test]
    fn sweep_emits_floor_range_over_step_plus_one_points_starting_at_t_min() {
        let mut engine = CurveEngine::new(|t| t.sin());
        let mut details = ModelDetails::default();
        let points = run(
            &mut engine,
            &mut details,
            &config(0.0, 7.5, 2.0, 1),
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        let temperatures: Vec<f64> = points.iter().map(|p| p.temperature).collect();
        assert_eq!(temperatures, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn temperature_never_decreases_and_rescaling_is_reset() {
        let mut engine = CurveEngine::new(|t| -0.1 * t);
        let mut details = ModelDetails {
            rescaling_factor: 1.07,
            ..ModelDetails::default()
        };
        run(
            &mut engine,
            &mut details,
            &config(10.0, 12.0, 1.0, 2),
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(details.rescaling_factor, 1.0);
        assert_eq!(engine.temperatures_seen[0], 8.0);
        assert!(
            engine
                .temperatures_seen
                .windows(2)
                .all(|w| w[1] >= w[0])
        );
    }

    #[test]
    fn rescaling_reference_extrapolates_previous_sample() {
        let mut engine = CurveEngine::new(|_| -2.0);
        let mut details = ModelDetails::default();
        let sweep =
            HeatCapacitySweep::new(&mut engine, &mut details, &config(0.0, 0.0, 1.0, 1)).unwrap();
        drop(sweep);
        // First reference is the MFE, the following ones extrapolate each sample.
        assert_eq!(engine.references[0], -3.0);
        let expected = -2.0 + 1.0 * RESCALE_SLOPE * 9.0;
        assert!(engine.references[1..].iter().all(|&r| r == expected));
    }

    #[test]
    fn non_finite_free_energy_is_fatal() {
        let mut engine = CurveEngine::new(|t| if t > 3.0 { f64::NAN } else { 0.0 });
        let mut details = ModelDetails::default();
        let mut emitted = 0;
        let result = run(
            &mut engine,
            &mut details,
            &config(0.0, 10.0, 1.0, 1),
            &ProgressReporter::new(),
            |_| {
                emitted += 1;
                Ok(())
            },
        );
        assert!(matches!(
            result,
            Err(EngineError::NonFiniteEnergy { .. })
        ));
        assert!(emitted < 11);
    }

    #[test]
    fn sweep_iterator_stops_after_last_point() {
        let mut engine = CurveEngine::new(|_| 0.0);
        let mut details = ModelDetails::default();
        let mut sweep =
            HeatCapacitySweep::new(&mut engine, &mut details, &config(0.0, 2.0, 1.0, 1)).unwrap();
        assert_eq!(sweep.remaining(), 3);
        assert!(sweep.next().is_some());
        assert!(sweep.next().is_some());
        assert!(sweep.next().is_some());
        assert!(sweep.next().is_none());
    }
}
