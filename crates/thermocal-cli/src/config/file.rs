use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileModelConfig {
    pub temperature: Option<f64>,
    pub dangles: Option<i64>,
    pub no_lp: Option<bool>,
    pub no_gu: Option<bool>,
    pub no_closing_gu: Option<bool>,
    pub no_tetra: Option<bool>,
    pub energy_model: Option<u8>,
    pub parameter_file: Option<PathBuf>,
    pub no_conversion: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileHeatConfig {
    pub t_min: Option<f64>,
    pub t_max: Option<f64>,
    pub step: Option<f64>,
    pub half_width: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileLineSearchConfig {
    pub initial_step_length: Option<f64>,
    pub min_step_size: Option<f64>,
    pub min_improvement: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePvminConfig {
    pub sigma: Option<f64>,
    pub tau: Option<f64>,
    pub objective: Option<i64>,
    pub sample_size: Option<usize>,
    pub cutoff: Option<f64>,
    pub pf_scale: Option<f64>,
    pub max_iterations: Option<usize>,
    pub seed: Option<u64>,
    pub intermediate_path: Option<PathBuf>,
    pub line_search: Option<FileLineSearchConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<FileModelConfig>,
    pub heat: Option<FileHeatConfig>,
    pub pvmin: Option<FilePvminConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
