use std::io::Cursor;
use thermocal::core::io::probing::ProbingData;
use thermocal::core::io::writers::write_perturbation_vector;
use thermocal::core::models::details::ModelDetails;
use thermocal::core::models::sequence::Sequence;
use thermocal::engine::config::PerturbationConfigBuilder;
use thermocal::engine::objective::ObjectiveKind;
use thermocal::engine::progress::ProgressReporter;
use thermocal::workflows::pvmin;

const PROBING: &str = "\
1 G 0.05
2 G 0.10
3 G 0.40
4 A 0.95
5 A 1.30
6 A 0.80
7 C 0.30
8 C 0.12
9 C 0.02
";

fn run(objective: ObjectiveKind, sample_size: usize) -> (Sequence, pvmin::PvminResult) {
    let sequence = Sequence::new("GGGAAACCC").unwrap();
    let probing = ProbingData::read_from(&mut Cursor::new(PROBING), &sequence).unwrap();
    let config = PerturbationConfigBuilder::new()
        .sigma(1.0)
        .tau(1.0)
        .objective(objective)
        .sample_size(sample_size)
        .cutoff(0.5)
        .seed(11)
        .build()
        .unwrap();
    let result = pvmin::run(
        &sequence,
        &ModelDetails::default(),
        &probing,
        &config,
        &ProgressReporter::new(),
    )
    .unwrap();
    (sequence, result)
}

#[test]
fn hairpin_calibration_terminates_with_one_line_per_position() {
    let (sequence, result) = run(ObjectiveKind::Quadratic, 0);
    assert_eq!(result.targets.classes(), &[0, 0, 0, 1, 1, 1, 0, 0, 0]);
    assert!(result.outcome.score.is_finite());

    let mut out = Vec::new();
    write_perturbation_vector(&mut out, &sequence, &result.epsilon).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);

    for (idx, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].parse::<usize>().unwrap(), idx + 1);
        assert_eq!(fields[1].chars().next(), Some(sequence.symbol_at(idx + 1)));
        assert!(fields[2].parse::<f64>().unwrap().is_finite());
    }
}

#[test]
fn absolute_objective_also_terminates() {
    let (_, result) = run(ObjectiveKind::Absolute, 0);
    assert!(result.epsilon.is_finite());
    assert!(result.outcome.iterations <= 100);
}

#[test]
fn sampled_statistics_give_a_finite_vector() {
    let (_, result) = run(ObjectiveKind::Quadratic, 200);
    assert_eq!(result.epsilon.len(), 9);
    assert!(result.epsilon.is_finite());
}
