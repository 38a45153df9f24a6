mod defaults;
mod file;

use crate::cli::{HeatArgs, ModelArgs, PvminArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
pub use file::FileConfig;
use file::FileModelConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thermocal::core::models::details::ModelDetails;
use thermocal::engine::config::{
    self as core_config, HeatCapacityConfig, HeatCapacityConfigBuilder, LineSearchConfig,
    PerturbationConfig, PerturbationConfigBuilder,
};
use tracing::debug;

/// Folding model settings resolved from every configuration layer.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub details: ModelDetails,
    pub convert_dna: bool,
    pub parameter_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HeatSettings {
    pub model: ModelSettings,
    pub sweep: HeatCapacityConfig,
}

#[derive(Debug, Clone)]
pub struct PvminSettings {
    pub model: ModelSettings,
    pub search: PerturbationConfig,
}

/// Reads the optional configuration file and applies `-S key=value` overrides on top.
pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let mut config = match path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(&mut config, set_values)?;
    Ok(config)
}

fn merge_model(
    args: &ModelArgs,
    file: FileModelConfig,
    defaults: &DefaultsConfig,
) -> ModelSettings {
    let dangles = args
        .dangles
        .or(file.dangles)
        .unwrap_or(defaults.dangles);
    let details = ModelDetails {
        temperature: file.temperature.unwrap_or(defaults.temperature),
        dangles: core_config::resolve_dangles(dangles),
        no_lonely_pairs: args.no_lp || file.no_lp.unwrap_or(false),
        no_gu: args.no_gu || file.no_gu.unwrap_or(false),
        no_gu_closure: args.no_closing_gu || file.no_closing_gu.unwrap_or(false),
        energy_set: args.energy_model.or(file.energy_model).unwrap_or(0),
        special_hairpins: !(args.no_tetra || file.no_tetra.unwrap_or(false)),
        ..ModelDetails::default()
    };
    ModelSettings {
        details,
        convert_dna: !(args.no_conversion || file.no_conversion.unwrap_or(false)),
        parameter_file: args.parameter_file.clone().or(file.parameter_file),
    }
}

pub fn heat_settings(args: &HeatArgs, mut file_config: FileConfig) -> Result<HeatSettings> {
    let defaults = DefaultsConfig::default();
    let model = merge_model(
        &args.model,
        file_config.model.take().unwrap_or_default(),
        &defaults,
    );
    let heat = file_config.heat.take().unwrap_or_default();

    let sweep = HeatCapacityConfigBuilder::new()
        .t_min(args.tmin.or(heat.t_min).unwrap_or(defaults.t_min))
        .t_max(args.tmax.or(heat.t_max).unwrap_or(defaults.t_max))
        .step(args.step.or(heat.step).unwrap_or(defaults.step))
        .half_width(
            args.ipoints
                .or(heat.half_width)
                .unwrap_or(defaults.half_width),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!(?sweep, "Resolved heat-capacity configuration");

    Ok(HeatSettings { model, sweep })
}

pub fn pvmin_settings(args: &PvminArgs, mut file_config: FileConfig) -> Result<PvminSettings> {
    let defaults = DefaultsConfig::default();
    let mut model = merge_model(
        &args.model,
        file_config.model.take().unwrap_or_default(),
        &defaults,
    );
    let pvmin = file_config.pvmin.take().unwrap_or_default();

    if let Some(temperature) = args.temp {
        model.details.temperature = temperature;
    }
    model.details.rescaling_factor = args
        .pf_scale
        .or(pvmin.pf_scale)
        .unwrap_or(defaults.pf_scale);

    let line_search = {
        let file = pvmin.line_search.unwrap_or_default();
        let base = LineSearchConfig::default();
        LineSearchConfig {
            initial_step_length: file
                .initial_step_length
                .unwrap_or(base.initial_step_length),
            min_step_size: file.min_step_size.unwrap_or(base.min_step_size),
            min_improvement: file.min_improvement.unwrap_or(base.min_improvement),
        }
    };

    let mut builder = PerturbationConfigBuilder::new()
        .sigma(args.sigma.or(pvmin.sigma).unwrap_or(defaults.sigma))
        .tau(args.tau.or(pvmin.tau).unwrap_or(defaults.tau))
        .objective_selector(
            args.objective
                .or(pvmin.objective)
                .unwrap_or(defaults.objective),
        )
        .sample_size(
            args.sample_size
                .or(pvmin.sample_size)
                .unwrap_or(defaults.sample_size),
        )
        .cutoff(args.cutoff.or(pvmin.cutoff).unwrap_or(defaults.cutoff))
        .max_iterations(
            args.max_iterations
                .or(pvmin.max_iterations)
                .unwrap_or(defaults.max_iterations),
        )
        .line_search(line_search);
    if let Some(seed) = args.seed.or(pvmin.seed) {
        builder = builder.seed(seed);
    }
    if let Some(prefix) = args.intermediate_path.clone().or(pvmin.intermediate_path) {
        builder = builder.checkpoint_prefix(prefix);
    }
    let search = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!(?search, "Resolved perturbation search configuration");

    Ok(PvminSettings { model, search })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(config: &mut FileConfig, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let (key, value) = (key.trim(), value.trim());

        if let Some(field) = key.strip_prefix("model.") {
            let model = config.model.get_or_insert_with(Default::default);
            match field {
                "temperature" => model.temperature = Some(parse_value(key, value, "float")?),
                "dangles" => model.dangles = Some(parse_value(key, value, "integer")?),
                "no-lp" => model.no_lp = Some(parse_value(key, value, "boolean")?),
                "no-gu" => model.no_gu = Some(parse_value(key, value, "boolean")?),
                "no-closing-gu" => {
                    model.no_closing_gu = Some(parse_value(key, value, "boolean")?)
                }
                "no-tetra" => model.no_tetra = Some(parse_value(key, value, "boolean")?),
                "energy-model" => model.energy_model = Some(parse_value(key, value, "integer")?),
                "parameter-file" => model.parameter_file = Some(PathBuf::from(value)),
                "no-conversion" => {
                    model.no_conversion = Some(parse_value(key, value, "boolean")?)
                }
                _ => return Err(unsupported_key(key)),
            }
        } else if let Some(field) = key.strip_prefix("heat.") {
            let heat = config.heat.get_or_insert_with(Default::default);
            match field {
                "t-min" => heat.t_min = Some(parse_value(key, value, "float")?),
                "t-max" => heat.t_max = Some(parse_value(key, value, "float")?),
                "step" => heat.step = Some(parse_value(key, value, "float")?),
                "half-width" => heat.half_width = Some(parse_value(key, value, "integer")?),
                _ => return Err(unsupported_key(key)),
            }
        } else if let Some(field) = key.strip_prefix("pvmin.") {
            let pvmin = config.pvmin.get_or_insert_with(Default::default);
            match field {
                "sigma" => pvmin.sigma = Some(parse_value(key, value, "float")?),
                "tau" => pvmin.tau = Some(parse_value(key, value, "float")?),
                "objective" => pvmin.objective = Some(parse_value(key, value, "integer")?),
                "sample-size" => pvmin.sample_size = Some(parse_value(key, value, "integer")?),
                "cutoff" => pvmin.cutoff = Some(parse_value(key, value, "float")?),
                "pf-scale" => pvmin.pf_scale = Some(parse_value(key, value, "float")?),
                "max-iterations" => {
                    pvmin.max_iterations = Some(parse_value(key, value, "integer")?)
                }
                "seed" => pvmin.seed = Some(parse_value(key, value, "integer")?),
                "intermediate-path" => pvmin.intermediate_path = Some(PathBuf::from(value)),
                "line-search.initial-step-length" => {
                    pvmin
                        .line_search
                        .get_or_insert_with(Default::default)
                        .initial_step_length = Some(parse_value(key, value, "float")?)
                }
                "line-search.min-step-size" => {
                    pvmin
                        .line_search
                        .get_or_insert_with(Default::default)
                        .min_step_size = Some(parse_value(key, value, "float")?)
                }
                "line-search.min-improvement" => {
                    pvmin
                        .line_search
                        .get_or_insert_with(Default::default)
                        .min_improvement = Some(parse_value(key, value, "float")?)
                }
                _ => return Err(unsupported_key(key)),
            }
        } else {
            return Err(unsupported_key(key));
        }
    }
    Ok(())
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!("Unsupported configuration key for --set: '{}'", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use thermocal::core::models::details::DangleModel;
    use thermocal::engine::objective::ObjectiveKind;

    fn pvmin_args() -> PvminArgs {
        PvminArgs {
            probing_file: PathBuf::from("reactivities.txt"),
            ..Default::default()
        }
    }

    #[test]
    fn heat_defaults_apply_without_file_or_flags() {
        let settings = heat_settings(&HeatArgs::default(), FileConfig::default()).unwrap();
        assert_eq!(settings.sweep.t_min, 0.0);
        assert_eq!(settings.sweep.t_max, 100.0);
        assert_eq!(settings.sweep.step, 1.0);
        assert_eq!(settings.sweep.half_width, 2);
        assert_eq!(settings.model.details.dangles, DangleModel::Double);
        assert!(settings.model.details.special_hairpins);
        assert!(settings.model.convert_dna);
        assert!(settings.model.parameter_file.is_none());
    }

    #[test]
    fn file_values_are_overridden_by_set_values_and_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thermocal.toml");
        fs::write(
            &path,
            "[heat]\nt-min = 10.0\nt-max = 50.0\nstep = 2.0\n\n[model]\nno-tetra = true\n",
        )
        .unwrap();

        let file = load(Some(&path), &["heat.step=0.5".to_string()]).unwrap();
        let args = HeatArgs {
            tmax: Some(30.0),
            ..Default::default()
        };
        let settings = heat_settings(&args, file).unwrap();
        assert_eq!(settings.sweep.t_min, 10.0);
        assert_eq!(settings.sweep.t_max, 30.0);
        assert_eq!(settings.sweep.step, 0.5);
        assert!(!settings.model.details.special_hairpins);
    }

    #[test]
    fn invalid_sweep_is_a_configuration_error() {
        let args = HeatArgs {
            tmin: Some(50.0),
            tmax: Some(10.0),
            ..Default::default()
        };
        let result = heat_settings(&args, FileConfig::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unsupported_dangles_fall_back_to_double() {
        let args = HeatArgs {
            model: ModelArgs {
                dangles: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };
        let settings = heat_settings(&args, FileConfig::default()).unwrap();
        assert_eq!(settings.model.details.dangles, DangleModel::Double);
    }

    #[test]
    fn pvmin_layers_resolve_search_and_model_settings() {
        let file = load(
            None,
            &[
                "pvmin.objective=1".to_string(),
                "pvmin.line-search.min-improvement=0.001".to_string(),
                "model.temperature=25".to_string(),
            ],
        )
        .unwrap();
        let args = PvminArgs {
            sample_size: Some(0),
            pf_scale: Some(1.2),
            seed: Some(9),
            intermediate_path: Some(PathBuf::from("out/vector")),
            ..pvmin_args()
        };
        let settings = pvmin_settings(&args, file).unwrap();
        assert_eq!(settings.search.objective, ObjectiveKind::Absolute);
        assert_eq!(settings.search.sample_size, 0);
        assert_eq!(settings.search.seed, Some(9));
        assert_eq!(settings.search.line_search.min_improvement, 0.001);
        assert_eq!(settings.search.line_search.initial_step_length, 0.5);
        assert_eq!(
            settings.search.checkpoint_prefix,
            Some(PathBuf::from("out/vector"))
        );
        assert_eq!(settings.model.details.temperature, 25.0);
        assert_eq!(settings.model.details.rescaling_factor, 1.2);
    }

    #[test]
    fn pvmin_temperature_flag_wins_over_file() {
        let file = load(None, &["model.temperature=25".to_string()]).unwrap();
        let args = PvminArgs {
            temp: Some(42.0),
            ..pvmin_args()
        };
        let settings = pvmin_settings(&args, file).unwrap();
        assert_eq!(settings.model.details.temperature, 42.0);
        assert_eq!(settings.search.sample_size, 1000);
        assert_eq!(settings.search.max_iterations, 100);
        assert_eq!(settings.search.objective, ObjectiveKind::Quadratic);
    }

    #[test]
    fn negative_weights_are_rejected() {
        let args = PvminArgs {
            sigma: Some(-1.0),
            ..pvmin_args()
        };
        assert!(matches!(
            pvmin_settings(&args, FileConfig::default()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["heat.step", "heat.ipoints=3", "heat.step=fast", "other.key=1"] {
            let result = load(None, &[bad.to_string()]);
            assert!(matches!(result, Err(CliError::Config(_))), "{}", bad);
        }
    }
}
