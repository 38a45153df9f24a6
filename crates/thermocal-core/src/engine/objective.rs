use super::statistics::PairingStatistics;
use crate::core::models::perturbation::{PerturbationVector, TargetClassification};

/// Selects how the data-fit residuals and the vector penalty are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveKind {
    /// Squared residuals with a squared penalty.
    #[default]
    Quadratic,
    /// Absolute residuals with an absolute-value penalty.
    Absolute,
}

impl ObjectiveKind {
    pub fn from_selector(selector: i64) -> Option<Self> {
        match selector {
            0 => Some(Self::Quadratic),
            1 => Some(Self::Absolute),
            _ => None,
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Self::Quadratic => 0,
            Self::Absolute => 1,
        }
    }

    pub fn strategy(self) -> &'static dyn ObjectiveFunction {
        match self {
            Self::Quadratic => &QuadraticObjective,
            Self::Absolute => &AbsoluteObjective,
        }
    }
}

/// Residual loss and vector penalty of one objective formulation.
pub trait ObjectiveFunction: Sync {
    fn name(&self) -> &'static str;
    fn loss(&self, residual: f64) -> f64;
    fn loss_derivative(&self, residual: f64) -> f64;
    fn penalty(&self, value: f64) -> f64;
    fn penalty_derivative(&self, value: f64) -> f64;
}

pub struct QuadraticObjective;

impl ObjectiveFunction for QuadraticObjective {
    fn name(&self) -> &'static str {
        "quadratic"
    }
    fn loss(&self, residual: f64) -> f64 {
        residual * residual
    }
    fn loss_derivative(&self, residual: f64) -> f64 {
        2.0 * residual
    }
    fn penalty(&self, value: f64) -> f64 {
        value * value
    }
    fn penalty_derivative(&self, value: f64) -> f64 {
        2.0 * value
    }
}

pub struct AbsoluteObjective;

/// Subgradient of `|x|`, zero at the kink.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl ObjectiveFunction for AbsoluteObjective {
    fn name(&self) -> &'static str {
        "absolute"
    }
    fn loss(&self, residual: f64) -> f64 {
        residual.abs()
    }
    fn loss_derivative(&self, residual: f64) -> f64 {
        sign(residual)
    }
    fn penalty(&self, value: f64) -> f64 {
        value.abs()
    }
    fn penalty_derivative(&self, value: f64) -> f64 {
        sign(value)
    }
}

/// Data fit plus `sigma * sum(penalty(eps)) + tau * sum(eps^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub sigma: f64,
    pub tau: f64,
}

impl Objective {
    pub fn new(kind: ObjectiveKind, sigma: f64, tau: f64) -> Self {
        Self { kind, sigma, tau }
    }

    pub fn fit(&self, unpaired: &[f64], targets: &TargetClassification) -> f64 {
        let strategy = self.kind.strategy();
        unpaired
            .iter()
            .zip(targets.targets())
            .map(|(p, q)| strategy.loss(p - q))
            .sum()
    }

    pub fn regularization(&self, epsilon: &PerturbationVector) -> f64 {
        let strategy = self.kind.strategy();
        let penalty: f64 = epsilon.iter().map(|e| strategy.penalty(e)).sum();
        let ridge: f64 = epsilon.iter().map(|e| e * e).sum();
        self.sigma * penalty + self.tau * ridge
    }

    pub fn score(
        &self,
        unpaired: &[f64],
        targets: &TargetClassification,
        epsilon: &PerturbationVector,
    ) -> f64 {
        self.fit(unpaired, targets) + self.regularization(epsilon)
    }

    /// Gradient with respect to every vector entry.
    ///
    /// Uses `dp_i/deps_mu = p_i * (p_mu - p(mu | i unpaired)) / kT`.
    pub fn gradient(
        &self,
        statistics: &PairingStatistics,
        targets: &TargetClassification,
        epsilon: &PerturbationVector,
        kt: f64,
    ) -> Vec<f64> {
        let strategy = self.kind.strategy();
        let p = statistics.unpaired();
        let weights: Vec<f64> = p
            .iter()
            .zip(targets.targets())
            .map(|(&p_i, q_i)| strategy.loss_derivative(p_i - q_i) * p_i / kt)
            .collect();

        (0..epsilon.len())
            .map(|mu| {
                let fit: f64 = weights
                    .iter()
                    .enumerate()
                    .filter(|&(_, &w)| w != 0.0)
                    .map(|(i, &w)| w * (p[mu] - statistics.conditional(i, mu)))
                    .sum();
                fit + self.sigma * strategy.penalty_derivative(epsilon[mu])
                    + 2.0 * self.tau * epsilon[mu]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(classes: &[u8]) -> TargetClassification {
        TargetClassification::from_classes(classes.to_vec()).unwrap()
    }

    #[test]
    fn selectors_round_trip_and_reject_unknown_values() {
        assert_eq!(ObjectiveKind::from_selector(0), Some(ObjectiveKind::Quadratic));
        assert_eq!(ObjectiveKind::from_selector(1), Some(ObjectiveKind::Absolute));
        assert_eq!(ObjectiveKind::from_selector(2), None);
        assert_eq!(ObjectiveKind::Absolute.selector(), 1);
        assert_eq!(ObjectiveKind::Quadratic.strategy().name(), "quadratic");
    }

    #[test]
    fn fit_measures_residuals_per_strategy() {
        let t = targets(&[0, 1]);
        let p = [0.5, 0.25];
        let quadratic = Objective::new(ObjectiveKind::Quadratic, 0.0, 0.0);
        let absolute = Objective::new(ObjectiveKind::Absolute, 0.0, 0.0);
        assert!((quadratic.fit(&p, &t) - (0.25 + 0.5625)).abs() < 1e-12);
        assert!((absolute.fit(&p, &t) - (0.5 + 0.75)).abs() < 1e-12);
    }

    #[test]
    fn zero_weights_disable_regularization() {
        let eps = PerturbationVector::from_values(vec![1.0, -2.0]);
        for kind in [ObjectiveKind::Quadratic, ObjectiveKind::Absolute] {
            assert_eq!(Objective::new(kind, 0.0, 0.0).regularization(&eps), 0.0);
        }
    }

    #[test]
    fn regularization_grows_with_sigma_and_tau_for_both_strategies() {
        let eps = PerturbationVector::from_values(vec![0.3, -0.7, 0.0, 1.5]);
        for kind in [ObjectiveKind::Quadratic, ObjectiveKind::Absolute] {
            let mut previous = Objective::new(kind, 0.0, 0.5).regularization(&eps);
            for sigma in [0.1, 0.5, 1.0, 4.0] {
                let current = Objective::new(kind, sigma, 0.5).regularization(&eps);
                assert!(current > previous, "{:?}: sigma {}", kind, sigma);
                previous = current;
            }
            let mut previous = Objective::new(kind, 0.5, 0.0).regularization(&eps);
            for tau in [0.1, 0.5, 1.0, 4.0] {
                let current = Objective::new(kind, 0.5, tau).regularization(&eps);
                assert!(current > previous, "{:?}: tau {}", kind, tau);
                previous = current;
            }
        }
    }

    #[test]
    fn absolute_penalty_is_the_l1_norm() {
        let eps = PerturbationVector::from_values(vec![0.5, -1.5]);
        let objective = Objective::new(ObjectiveKind::Absolute, 2.0, 0.0);
        assert!((objective.regularization(&eps) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_vanishes_when_prediction_matches_targets() {
        let stats = PairingStatistics::from_parts(
            vec![0.0, 1.0],
            vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        );
        let objective = Objective::new(ObjectiveKind::Quadratic, 1.0, 1.0);
        let grad = objective.gradient(
            &stats,
            &targets(&[0, 1]),
            &PerturbationVector::zeros(2),
            0.6,
        );
        assert_eq!(grad, vec![0.0, 0.0]);
    }

    #[test]
    fn gradient_includes_regularization_terms() {
        let stats = PairingStatistics::from_parts(
            vec![0.0, 1.0],
            vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        );
        let eps = PerturbationVector::from_values(vec![1.0, -2.0]);
        let objective = Objective::new(ObjectiveKind::Absolute, 0.5, 0.25);
        let grad = objective.gradient(&stats, &targets(&[0, 1]), &eps, 0.6);
        assert!((grad[0] - (0.5 + 0.5)).abs() < 1e-12);
        assert!((grad[1] - (-0.5 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn gradient_follows_unpaired_probability_response() {
        // Two independent positions, each unpaired with probability 0.5.
        let stats = PairingStatistics::from_parts(
            vec![0.5, 0.5],
            vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        );
        let objective = Objective::new(ObjectiveKind::Quadratic, 0.0, 0.0);
        let grad = objective.gradient(
            &stats,
            &targets(&[1, 0]),
            &PerturbationVector::zeros(2),
            1.0,
        );
        // Raising eps_1 penalizes position 1 being unpaired, moving it away from its target.
        assert!((grad[0] - 0.25).abs() < 1e-12);
        assert!((grad[1] - -0.25).abs() < 1e-12);
    }
}
