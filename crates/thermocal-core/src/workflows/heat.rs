use crate::core::fold::{FoldingEngine, RnaFolder};
use crate::core::io::writers::write_heat_capacity_line;
use crate::core::models::details::ModelDetails;
use crate::core::models::sequence::Sequence;
use crate::engine::config::HeatCapacityConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use crate::engine::tasks::heat_capacity::HeatCapacityPoint;
use std::io::Write;
use tracing::{info, instrument};

/// Computes the heat-capacity curve of `sequence` with the reference folding engine.
///
/// Every point is written to `sink` as soon as it is available, so a failure part-way
/// through leaves only complete lines behind.
#[instrument(skip_all, name = "heat_workflow", fields(length = sequence.len()))]
pub fn run<W: Write>(
    sequence: &Sequence,
    details: &mut ModelDetails,
    config: &HeatCapacityConfig,
    reporter: &ProgressReporter,
    sink: &mut W,
) -> Result<Vec<HeatCapacityPoint>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let mut engine = RnaFolder::new(sequence.clone(), details)?;
    reporter.report(Progress::PhaseFinish);

    run_with_engine(&mut engine, details, config, reporter, sink)
}

/// Same as [`run`], driving a caller-supplied engine.
pub fn run_with_engine<E, W>(
    engine: &mut E,
    details: &mut ModelDetails,
    config: &HeatCapacityConfig,
    reporter: &ProgressReporter,
    sink: &mut W,
) -> Result<Vec<HeatCapacityPoint>, EngineError>
where
    E: FoldingEngine + ?Sized,
    W: Write,
{
    reporter.report(Progress::PhaseStart {
        name: "Heat Capacity Sweep",
    });
    let points = tasks::heat_capacity::run(engine, details, config, reporter, |point| {
        write_heat_capacity_line(sink, point.temperature, point.heat_capacity)?;
        Ok(())
    })?;
    sink.flush()?;
    reporter.report(Progress::PhaseFinish);

    info!("Workflow complete. Emitted {} point(s).", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::HeatCapacityConfigBuilder;

    #[test]
    fn writes_one_line_per_point() {
        let sequence = Sequence::new("GGGGAAACCCC").unwrap();
        let mut details = ModelDetails::default();
        let config = HeatCapacityConfigBuilder::new()
            .t_min(30.0)
            .t_max(40.0)
            .step(2.0)
            .half_width(2)
            .build()
            .unwrap();
        let mut out = Vec::new();
        let points = run(
            &sequence,
            &mut details,
            &config,
            &ProgressReporter::new(),
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("30\t"));
        assert!(points.iter().all(|p| p.heat_capacity.is_finite()));
    }
}
