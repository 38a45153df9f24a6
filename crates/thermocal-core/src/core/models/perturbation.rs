use std::ops::Index;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ClassificationError {
    #[error("Target class at position {position} must be 0 or 1, found {value}")]
    InvalidClass { position: usize, value: u8 },
}

/// Per-position pseudo-energies (kcal/mol) applied to unpaired nucleotides, indexed from 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerturbationVector {
    values: Vec<f64>,
}

impl PerturbationVector {
    pub fn zeros(length: usize) -> Self {
        Self {
            values: vec![0.0; length],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Returns `self - step * direction`.
    pub fn stepped(&self, direction: &[f64], step: f64) -> Self {
        Self {
            values: self
                .values
                .iter()
                .zip(direction)
                .map(|(v, d)| v - step * d)
                .collect(),
        }
    }
}

impl Index<usize> for PerturbationVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

/// Binary paired (0) / unpaired (1) calls derived from probing reactivities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetClassification {
    classes: Vec<u8>,
}

impl TargetClassification {
    /// Reactivities below `cutoff` are classified as paired, everything else as unpaired.
    pub fn from_reactivities(reactivities: &[f64], cutoff: f64) -> Self {
        Self {
            classes: reactivities
                .iter()
                .map(|&r| if r < cutoff { 0 } else { 1 })
                .collect(),
        }
    }

    pub fn from_classes(classes: Vec<u8>) -> Result<Self, ClassificationError> {
        if let Some((idx, &value)) = classes.iter().enumerate().find(|&(_, &c)| c > 1) {
            return Err(ClassificationError::InvalidClass {
                position: idx + 1,
                value,
            });
        }
        Ok(Self { classes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    pub fn targets(&self) -> impl Iterator<Item = f64> + '_ {
        self.classes.iter().map(|&c| f64::from(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_thresholds_at_cutoff() {
        let targets = TargetClassification::from_reactivities(&[0.1, 0.5, 0.9, -1.0], 0.5);
        assert_eq!(targets.classes(), &[0, 1, 1, 0]);
        assert_eq!(targets.targets().collect::<Vec<_>>(), vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn from_classes_rejects_non_binary_values() {
        assert_eq!(
            TargetClassification::from_classes(vec![0, 1, 2]),
            Err(ClassificationError::InvalidClass {
                position: 3,
                value: 2
            })
        );
    }

    #[test]
    fn stepped_moves_against_direction() {
        let eps = PerturbationVector::from_values(vec![1.0, -1.0]);
        let next = eps.stepped(&[2.0, -2.0], 0.5);
        assert_eq!(next.as_slice(), &[0.0, 0.0]);
        assert!(next.is_zero());
    }

    #[test]
    fn indexing_is_zero_based() {
        let eps = PerturbationVector::from_values(vec![0.5, 1.5, f64::NAN]);
        assert_eq!(eps[0], 0.5);
        assert_eq!(eps.len(), 3);
        assert!(!eps.is_finite());
    }
}
