use super::FoldingError;
use super::inside::{Boltzmann, InsideTables, Rules};
use super::params::MIN_HAIRPIN;
use rand::RngCore;
use rand::distributions::{Distribution, WeightedIndex};

#[derive(Debug, Clone, Copy)]
enum Segment {
    /// Prefix `1..=j` of the exterior loop.
    Exterior(usize),
    /// `(i, j)` is paired.
    Pair(usize, usize),
    /// At least one multiloop branch in `i..=j`.
    Multi(usize, usize),
    /// One multiloop branch starting at `i`, trailing unpaired up to `j`.
    Branch(usize, usize),
}

fn choose(weights: &[f64], rng: &mut dyn RngCore) -> Result<usize, FoldingError> {
    let dist = WeightedIndex::new(weights)?;
    Ok(dist.sample(rng))
}

/// Draws one structure by stochastic backtracking through the inside tables.
pub(crate) fn sample_structure(
    rules: &Rules<'_, Boltzmann>,
    inside: &InsideTables,
    rng: &mut dyn RngCore,
) -> Result<String, FoldingError> {
    let n = rules.model.length();
    let (qb, qm, qm1, z5) = (&inside.qb, &inside.qm, &inside.qm1, &inside.z5);
    let mut structure = vec!['.'; n];
    let mut stack = vec![Segment::Exterior(n)];
    let mut weights = Vec::new();

    while let Some(segment) = stack.pop() {
        weights.clear();

        match segment {
            Segment::Exterior(0) => {}
            Segment::Exterior(j) => {
                let mut targets = Vec::new();
                weights.push(z5[j - 1] * rules.exterior_unpaired(j));
                targets.push(0);
                for k in 1..=j.saturating_sub(MIN_HAIRPIN + 1) {
                    if rules.can_pair(k, j) {
                        weights.push(z5[k - 1] * qb[(k, j)] * rules.exterior_branch(k, j));
                        targets.push(k);
                    }
                }
                match targets[choose(&weights, rng)?] {
                    0 => stack.push(Segment::Exterior(j - 1)),
                    k => {
                        stack.push(Segment::Exterior(k - 1));
                        stack.push(Segment::Pair(k, j));
                    }
                }
            }
            Segment::Pair(i, j) => {
                structure[i - 1] = '(';
                structure[j - 1] = ')';

                let mut targets = Vec::new();
                // Targets: (0, 0) hairpin, (k, l) interior, (u, 0) multiloop split at u.
                weights.push(rules.hairpin(i, j));
                targets.push((0, 0));
                for (k, l) in rules.interior_candidates(i, j) {
                    if rules.can_pair(k, l) {
                        weights.push(rules.interior(i, j, k, l) * qb[(k, l)]);
                        targets.push((k, l));
                    }
                }
                let closing = rules.multi_closing(i, j);
                for u in (i + 2)..j {
                    weights.push(closing * qm[(i + 1, u - 1)] * qm1[(u, j - 1)]);
                    targets.push((u, 0));
                }
                match targets[choose(&weights, rng)?] {
                    (0, 0) => {}
                    (u, 0) => {
                        stack.push(Segment::Multi(i + 1, u - 1));
                        stack.push(Segment::Branch(u, j - 1));
                    }
                    (k, l) => stack.push(Segment::Pair(k, l)),
                }
            }
            Segment::Multi(i, j) => {
                let mut targets = Vec::new();
                // Targets: (u, false) unpaired prefix, (u, true) further branches before u.
                for u in i..=(j - MIN_HAIRPIN - 1) {
                    weights.push(rules.multi_unpaired(i, u - 1) * qm1[(u, j)]);
                    targets.push((u, false));
                    if u > i {
                        weights.push(qm[(i, u - 1)] * qm1[(u, j)]);
                        targets.push((u, true));
                    }
                }
                let (u, more) = targets[choose(&weights, rng)?];
                if more {
                    stack.push(Segment::Multi(i, u - 1));
                }
                stack.push(Segment::Branch(u, j));
            }
            Segment::Branch(i, j) => {
                let mut targets = Vec::new();
                for l in (i + MIN_HAIRPIN + 1)..=j {
                    if rules.can_pair(i, l) {
                        weights.push(
                            qb[(i, l)] * rules.multi_branch(i, l) * rules.multi_unpaired(l + 1, j),
                        );
                        targets.push(l);
                    }
                }
                let l = targets[choose(&weights, rng)?];
                stack.push(Segment::Pair(i, l));
            }
        }
    }

    Ok(structure.into_iter().collect())
}
