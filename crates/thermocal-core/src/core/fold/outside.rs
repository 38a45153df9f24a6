use super::FoldingError;
use super::inside::{Boltzmann, InsideTables, Rules};
use super::matrix::Matrix;
use super::params::MIN_HAIRPIN;

/// Base-pair probabilities from the outside recursion.
///
/// Walks the inside rules in reverse order, accumulating for every table entry the summed
/// weight of all contexts it can appear in. `P(i, j) = qb[i][j] * qb_hat[i][j] / Z`.
pub(crate) fn pair_probabilities(
    rules: &Rules<'_, Boltzmann>,
    inside: &InsideTables,
) -> Result<Matrix, FoldingError> {
    let n = rules.model.length();
    let z = inside.z5[n];
    if !(z.is_finite() && z > 0.0) {
        return Err(FoldingError::NumericOverflow);
    }
    let (qb, qm, qm1) = (&inside.qb, &inside.qm, &inside.qm1);

    let mut z5_hat = vec![0.0; n + 1];
    z5_hat[n] = 1.0;
    for j in (0..n).rev() {
        let k = j + 1;
        let mut total = z5_hat[k] * rules.exterior_unpaired(k);
        for l in (k + MIN_HAIRPIN + 1)..=n {
            if rules.can_pair(k, l) {
                total += z5_hat[l] * qb[(k, l)] * rules.exterior_branch(k, l);
            }
        }
        z5_hat[j] = total;
    }

    let mut qb_hat = Matrix::filled(n, 0.0);
    let mut qm_hat = Matrix::filled(n, 0.0);
    let mut qm1_hat = Matrix::filled(n, 0.0);
    for k in 1..=n {
        for l in (k + MIN_HAIRPIN + 1)..=n {
            if rules.can_pair(k, l) {
                qb_hat[(k, l)] = z5_hat[l] * inside.z5[k - 1] * rules.exterior_branch(k, l);
            }
        }
    }

    let mut probabilities = Matrix::filled(n, 0.0);
    for span in ((MIN_HAIRPIN + 1)..n).rev() {
        for i in 1..=(n - span) {
            let j = i + span;

            let outer = qm_hat[(i, j)];
            if outer != 0.0 {
                for u in i..=(j - MIN_HAIRPIN - 1) {
                    qm1_hat[(u, j)] += outer * (rules.multi_unpaired(i, u - 1) + qm[(i, u - 1)]);
                    if u > i {
                        qm_hat[(i, u - 1)] += outer * qm1[(u, j)];
                    }
                }
            }

            let outer = qm1_hat[(i, j)];
            if outer != 0.0 {
                for l in (i + MIN_HAIRPIN + 1)..=j {
                    if rules.can_pair(i, l) {
                        qb_hat[(i, l)] +=
                            outer * rules.multi_branch(i, l) * rules.multi_unpaired(l + 1, j);
                    }
                }
            }

            let outer = qb_hat[(i, j)];
            if outer != 0.0 && qb[(i, j)] != 0.0 {
                for (k, l) in rules.interior_candidates(i, j) {
                    if rules.can_pair(k, l) {
                        qb_hat[(k, l)] += outer * rules.interior(i, j, k, l);
                    }
                }
                let closing = outer * rules.multi_closing(i, j);
                if closing != 0.0 {
                    for u in (i + 2)..j {
                        qm_hat[(i + 1, u - 1)] += closing * qm1[(u, j - 1)];
                        qm1_hat[(u, j - 1)] += closing * qm[(i + 1, u - 1)];
                    }
                }
                probabilities[(i, j)] = qb[(i, j)] * outer / z;
            }
        }
    }

    Ok(probabilities)
}

/// Probability of each position being unpaired; index 0 is position 1.
pub(crate) fn unpaired_from_pairs(probabilities: &Matrix, length: usize) -> Vec<f64> {
    let mut paired = vec![0.0; length + 1];
    for i in 1..=length {
        for j in (i + 1)..=length {
            let p = probabilities[(i, j)];
            paired[i] += p;
            paired[j] += p;
        }
    }
    paired[1..]
        .iter()
        .map(|p| (1.0 - p).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fold::inside::fill;
    use crate::core::fold::model::{Constraints, EnergyModel};
    use crate::core::fold::params::EnergyParameters;
    use crate::core::models::details::ModelDetails;
    use crate::core::models::sequence::Sequence;

    fn model(raw: &str) -> EnergyModel {
        let sequence = Sequence::new(raw).unwrap();
        EnergyModel::new(&sequence, &EnergyParameters::default(), &ModelDetails::default())
            .unwrap()
    }

    #[test]
    fn single_possible_pair_gets_its_boltzmann_share() {
        let m = model("GAAAC");
        let constraints = Constraints::none(5);
        let alg = Boltzmann::new(m.kt(), 1.0, 5);
        let rules = Rules::new(&m, &constraints, &alg);
        let inside = fill(&rules);
        let probabilities = pair_probabilities(&rules, &inside).unwrap();
        let w = rules.hairpin(1, 5) * rules.exterior_branch(1, 5);
        assert!((probabilities[(1, 5)] - w / (1.0 + w)).abs() < 1e-12);
    }

    #[test]
    fn pair_probabilities_per_position_never_exceed_one() {
        let m = model("GGGGAAACCCCAUAUGCGAAAGCA");
        let n = m.length();
        let constraints = Constraints::none(n);
        let alg = Boltzmann::new(m.kt(), 1.0, n);
        let rules = Rules::new(&m, &constraints, &alg);
        let inside = fill(&rules);
        let probabilities = pair_probabilities(&rules, &inside).unwrap();
        for i in 1..=n {
            let total: f64 = (1..=n)
                .map(|j| {
                    if i < j {
                        probabilities[(i, j)]
                    } else {
                        probabilities[(j, i)]
                    }
                })
                .sum();
            assert!(total <= 1.0 + 1e-9, "position {} has paired mass {}", i, total);
        }
        let unpaired = unpaired_from_pairs(&probabilities, n);
        assert_eq!(unpaired.len(), n);
        assert!(unpaired.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn zero_partition_function_is_reported_as_overflow() {
        let m = model("GGGAAACCC");
        let constraints = Constraints::none(9);
        let alg = Boltzmann::new(m.kt(), f64::INFINITY, 9);
        let rules = Rules::new(&m, &constraints, &alg);
        let inside = fill(&rules);
        assert!(matches!(
            pair_probabilities(&rules, &inside),
            Err(FoldingError::NumericOverflow)
        ));
    }
}
