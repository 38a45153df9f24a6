/// Offset between degrees Celsius and Kelvin.
pub const K0: f64 = 273.15;
/// Gas constant in cal/(mol·K).
pub const GAS_CONSTANT: f64 = 1.98717;

pub const DEFAULT_TEMPERATURE: f64 = 37.0;
pub const DEFAULT_RESCALING_FACTOR: f64 = 1.07;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DangleModel {
    /// No dangling-end contributions.
    None,
    /// Dangles on both sides of every helix end, regardless of the neighbours' state.
    #[default]
    Double,
}

impl DangleModel {
    pub fn from_selector(selector: i64) -> Option<Self> {
        match selector {
            0 => Some(Self::None),
            2 => Some(Self::Double),
            _ => None,
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Double => 2,
        }
    }
}

/// Model settings handed to every folding engine call.
///
/// The struct is owned by the caller. Pipelines that vary the temperature mutate it in place
/// and re-apply it to the engine after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDetails {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    pub dangles: DangleModel,
    pub no_lonely_pairs: bool,
    pub no_gu: bool,
    pub no_gu_closure: bool,
    pub energy_set: u8,
    /// Apply the special tetraloop hairpin table.
    pub special_hairpins: bool,
    /// Multiplier applied to the reference energy when partition sums are rescaled.
    pub rescaling_factor: f64,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            dangles: DangleModel::default(),
            no_lonely_pairs: false,
            no_gu: false,
            no_gu_closure: false,
            energy_set: 0,
            special_hairpins: true,
            rescaling_factor: DEFAULT_RESCALING_FACTOR,
        }
    }
}

impl ModelDetails {
    #[inline]
    pub fn kelvin(&self) -> f64 {
        self.temperature + K0
    }

    /// Thermal energy kT in kcal/mol.
    #[inline]
    pub fn thermal_energy(&self) -> f64 {
        self.kelvin() * GAS_CONSTANT / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermal_energy_at_body_temperature() {
        let details = ModelDetails::default();
        assert!((details.thermal_energy() - 0.616_31).abs() < 1e-4);
    }

    #[test]
    fn dangle_selector_accepts_only_zero_and_two() {
        assert_eq!(DangleModel::from_selector(0), Some(DangleModel::None));
        assert_eq!(DangleModel::from_selector(2), Some(DangleModel::Double));
        assert_eq!(DangleModel::from_selector(1), None);
        assert_eq!(DangleModel::from_selector(3), None);
    }
}
