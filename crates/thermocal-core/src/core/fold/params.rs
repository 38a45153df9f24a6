use crate::core::models::details::K0;
use phf::{Map, phf_map};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Largest number of unpaired nucleotides in a tabulated loop.
pub const MAX_LOOP: usize = 30;
/// Smallest allowed hairpin loop.
pub const MIN_HAIRPIN: usize = 3;

const REFERENCE_KELVIN: f64 = 37.0 + K0;

/// A free-energy parameter at 37 °C together with its enthalpy, both in kcal/mol.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Thermo {
    pub dg37: f64,
    pub dh: f64,
}

impl Thermo {
    pub const FORBIDDEN: Thermo = Thermo {
        dg37: f64::INFINITY,
        dh: f64::INFINITY,
    };

    pub const fn new(dg37: f64, dh: f64) -> Self {
        Self { dg37, dh }
    }

    /// Free energy at an absolute temperature, assuming a temperature-independent entropy.
    #[inline]
    pub fn at(&self, kelvin: f64) -> f64 {
        if !self.dg37.is_finite() {
            return f64::INFINITY;
        }
        self.dh - (self.dh - self.dg37) * kelvin / REFERENCE_KELVIN
    }
}

/// Hairpins (closing pair plus loop) with a tabulated total energy.
#[rustfmt::skip]
static TETRALOOPS: Map<&'static str, Thermo> = phf_map! {
    "CAACGG" => Thermo::new(5.5, 6.9),
    "CCAAGG" => Thermo::new(3.3, -10.3),
    "CCACGG" => Thermo::new(3.7, -3.3),
    "CCCAGG" => Thermo::new(3.4, -8.9),
    "CCGAGG" => Thermo::new(3.5, -6.6),
    "CCGCGG" => Thermo::new(3.6, -7.5),
    "CCUAGG" => Thermo::new(3.7, -3.5),
    "CCUCGG" => Thermo::new(2.5, -13.9),
    "CUAAGG" => Thermo::new(3.6, -7.6),
    "CUACGG" => Thermo::new(2.8, -10.7),
    "CUCAGG" => Thermo::new(3.7, -6.6),
    "CUCCGG" => Thermo::new(2.7, -12.9),
    "CUGCGG" => Thermo::new(2.8, -10.7),
    "CUUAGG" => Thermo::new(3.5, -6.2),
    "CUUCGG" => Thermo::new(3.7, -15.3),
    "CUUUGG" => Thermo::new(3.7, -6.8),
};

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid energy parameters in '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

/// Nearest-neighbour energy parameters.
///
/// Pair-indexed tables use the order CG, GC, GU, UG, AU, UA; base-indexed columns use
/// A, C, G, U. Loop tables are indexed by the number of unpaired nucleotides and must cover
/// sizes `0..=MAX_LOOP`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EnergyParameters {
    pub stack: [[Thermo; 6]; 6],
    pub hairpin: Vec<Thermo>,
    pub bulge: Vec<Thermo>,
    pub interior: Vec<Thermo>,
    pub ninio: Thermo,
    pub max_ninio: f64,
    pub terminal_au: Thermo,
    pub ml_closing: Thermo,
    pub ml_intern: Thermo,
    pub ml_base: Thermo,
    pub dangle5: [[Thermo; 4]; 6],
    pub dangle3: [[Thermo; 4]; 6],
    /// Coefficient of the logarithmic loop extrapolation at 37 °C.
    pub lxc37: f64,
}

impl EnergyParameters {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let params: Self = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        params.validate().map_err(|reason| ParamLoadError::Invalid {
            path: path.to_string_lossy().to_string(),
            reason,
        })?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), String> {
        for (name, table) in [
            ("hairpin", &self.hairpin),
            ("bulge", &self.bulge),
            ("interior", &self.interior),
        ] {
            if table.len() != MAX_LOOP + 1 {
                return Err(format!(
                    "table '{}' has {} entries, expected {}",
                    name,
                    table.len(),
                    MAX_LOOP + 1
                ));
            }
        }
        if self.max_ninio < 0.0 {
            return Err("max-ninio must not be negative".to_string());
        }
        Ok(())
    }

    /// Evaluates every parameter at an absolute temperature.
    pub(crate) fn scaled(&self, kelvin: f64, kt: f64) -> ScaledParameters {
        let pair_table = |table: &[[Thermo; 6]; 6]| {
            let mut out = [[0.0; 6]; 6];
            for (row, src) in out.iter_mut().zip(table) {
                for (cell, t) in row.iter_mut().zip(src) {
                    *cell = t.at(kelvin);
                }
            }
            out
        };
        let base_table = |table: &[[Thermo; 4]; 6]| {
            let mut out = [[0.0; 4]; 6];
            for (row, src) in out.iter_mut().zip(table) {
                for (cell, t) in row.iter_mut().zip(src) {
                    *cell = t.at(kelvin);
                }
            }
            out
        };
        let loop_table =
            |table: &[Thermo]| table.iter().map(|t| t.at(kelvin)).collect::<Vec<f64>>();

        ScaledParameters {
            kelvin,
            kt,
            stack: pair_table(&self.stack),
            hairpin: loop_table(&self.hairpin),
            bulge: loop_table(&self.bulge),
            interior: loop_table(&self.interior),
            ninio: self.ninio.at(kelvin),
            max_ninio: self.max_ninio,
            terminal_au: self.terminal_au.at(kelvin),
            ml_closing: self.ml_closing.at(kelvin),
            ml_intern: self.ml_intern.at(kelvin),
            ml_base: self.ml_base.at(kelvin),
            dangle5: base_table(&self.dangle5),
            dangle3: base_table(&self.dangle3),
            lxc: self.lxc37 * kelvin / REFERENCE_KELVIN,
        }
    }
}

fn pair_table(dg: [[f64; 6]; 6], dh: [[f64; 6]; 6]) -> [[Thermo; 6]; 6] {
    let mut out = [[Thermo::FORBIDDEN; 6]; 6];
    for i in 0..6 {
        for j in 0..6 {
            out[i][j] = Thermo::new(dg[i][j], dh[i][j]);
        }
    }
    out
}

fn base_table(dg: [[f64; 4]; 6], dh: [[f64; 4]; 6]) -> [[Thermo; 4]; 6] {
    let mut out = [[Thermo::FORBIDDEN; 4]; 6];
    for i in 0..6 {
        for j in 0..4 {
            out[i][j] = Thermo::new(dg[i][j], dh[i][j]);
        }
    }
    out
}

/// Builds a loop table whose first allowed size is `first_size`. Missing enthalpies repeat
/// the last given value.
fn loop_table(first_size: usize, dg: &[f64], dh: &[f64]) -> Vec<Thermo> {
    let mut table = vec![Thermo::FORBIDDEN; first_size];
    for (idx, &g) in dg.iter().enumerate() {
        let h = dh.get(idx).or(dh.last()).copied().unwrap_or(0.0);
        table.push(Thermo::new(g, h));
    }
    table.truncate(MAX_LOOP + 1);
    table
}

impl Default for EnergyParameters {
    #[rustfmt::skip]
    fn default() -> Self {
        let stack_dg = [
            [-2.40, -3.30, -2.10, -1.40, -2.10, -2.10],
            [-3.30, -3.40, -2.50, -1.50, -2.20, -2.40],
            [-2.10, -2.50,  1.30, -0.50, -1.40, -1.30],
            [-1.40, -1.50, -0.50,  0.30, -0.60, -1.00],
            [-2.10, -2.20, -1.40, -0.60, -1.10, -0.90],
            [-2.10, -2.40, -1.30, -1.00, -0.90, -1.30],
        ];
        let stack_dh = [
            [-10.60, -13.40, -12.10,  -5.60, -10.50, -10.40],
            [-13.40, -14.90, -12.60,  -8.30, -11.40, -12.40],
            [-12.10, -12.60, -14.60, -13.50,  -8.80, -12.80],
            [ -5.60,  -8.30, -13.50,  -9.30,  -3.20,  -7.00],
            [-10.50, -11.40,  -8.80,  -3.20,  -9.40,  -6.80],
            [-10.40, -12.40, -12.80,  -7.00,  -6.80,  -7.70],
        ];
        let dangle5_dg = [
            [-0.50, -0.30, -0.20, -0.10],
            [-0.20, -0.30, -0.00, -0.00],
            [-0.30, -0.30, -0.40, -0.20],
            [-0.30, -0.10, -0.20, -0.20],
            [-0.30, -0.30, -0.40, -0.20],
            [-0.30, -0.10, -0.20, -0.20],
        ];
        let dangle5_dh = [
            [-2.40, -0.60, -0.40,  0.00],
            [-1.10, -0.70, -0.30, -0.60],
            [-0.50, -0.10, -0.70, -0.40],
            [-0.70, -0.30, -0.50, -0.50],
            [-0.50, -0.10, -0.70, -0.40],
            [-0.70, -0.30, -0.50, -0.50],
        ];
        let dangle3_dg = [
            [-1.10, -0.40, -1.30, -0.60],
            [-1.70, -0.80, -1.70, -1.20],
            [-0.70, -0.10, -0.70, -0.10],
            [-0.80, -0.50, -0.80, -0.60],
            [-0.70, -0.10, -0.70, -0.10],
            [-0.80, -0.50, -0.80, -0.60],
        ];
        let dangle3_dh = [
            [-4.90, -0.90, -5.50, -2.30],
            [-7.40, -2.80, -6.40, -3.60],
            [-4.90, -0.90, -5.50, -2.30],
            [-5.70, -0.70, -5.80, -2.20],
            [-4.90, -0.90, -5.50, -2.30],
            [-5.70, -0.70, -5.80, -2.20],
        ];

        Self {
            stack: pair_table(stack_dg, stack_dh),
            hairpin: loop_table(
                MIN_HAIRPIN,
                &[
                    5.40, 5.60, 5.70, 5.40, 6.00, 5.50, 6.40,
                    6.50, 6.60, 6.70, 6.78, 6.86, 6.94, 7.01, 7.07, 7.13, 7.19,
                    7.25, 7.30, 7.35, 7.40, 7.44, 7.49, 7.53, 7.57, 7.61, 7.65,
                    7.69,
                ],
                &[1.30, 4.80, 3.60, -2.90, 1.30, -2.90, 5.00],
            ),
            bulge: loop_table(
                1,
                &[
                    3.80, 2.80, 3.20, 3.60, 4.00, 4.40, 4.59, 4.70, 4.80, 4.90,
                    5.00, 5.10, 5.20, 5.30, 5.40, 5.40, 5.50, 5.50, 5.60, 5.70,
                    5.70, 5.80, 5.80, 5.80, 5.90, 5.90, 6.00, 6.00, 6.00, 6.10,
                ],
                &[10.60, 7.10],
            ),
            interior: loop_table(
                2,
                &[
                    0.50, 1.60, 1.10, 2.00, 2.00, 2.20, 2.30, 2.40, 2.50,
                    2.60, 2.70, 2.80, 2.90, 2.90, 3.00, 3.10, 3.10, 3.20, 3.30,
                    3.30, 3.40, 3.40, 3.50, 3.50, 3.50, 3.60, 3.60, 3.70, 3.70,
                ],
                &[-1.00, -1.00, -7.20],
            ),
            ninio: Thermo::new(0.60, -1.10),
            max_ninio: 3.00,
            terminal_au: Thermo::new(0.50, 3.70),
            ml_closing: Thermo::new(9.30, 30.00),
            ml_intern: Thermo::new(-0.90, -2.20),
            ml_base: Thermo::new(0.00, 0.00),
            dangle5: base_table(dangle5_dg, dangle5_dh),
            dangle3: base_table(dangle3_dg, dangle3_dh),
            lxc37: 1.07856,
        }
    }
}

/// Energy parameters evaluated at one temperature, in kcal/mol.
#[derive(Debug, Clone)]
pub(crate) struct ScaledParameters {
    pub kelvin: f64,
    pub kt: f64,
    pub stack: [[f64; 6]; 6],
    pub hairpin: Vec<f64>,
    pub bulge: Vec<f64>,
    pub interior: Vec<f64>,
    pub ninio: f64,
    pub max_ninio: f64,
    pub terminal_au: f64,
    pub ml_closing: f64,
    pub ml_intern: f64,
    pub ml_base: f64,
    pub dangle5: [[f64; 4]; 6],
    pub dangle3: [[f64; 4]; 6],
    pub lxc: f64,
}

impl ScaledParameters {
    /// Loop initiation energy, extrapolated logarithmically past `MAX_LOOP`.
    #[inline]
    pub fn loop_energy(&self, table: &[f64], size: usize) -> f64 {
        if size <= MAX_LOOP {
            table[size]
        } else {
            table[MAX_LOOP] + self.lxc * (size as f64 / MAX_LOOP as f64).ln()
        }
    }

    /// Tabulated total energy of a special hairpin, if any.
    pub fn tetraloop(&self, hairpin: &str) -> Option<f64> {
        TETRALOOPS.get(hairpin).map(|t| t.at(self.kelvin))
    }
}
