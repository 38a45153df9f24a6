use thermocal::core::models::details::{DEFAULT_RESCALING_FACTOR, DEFAULT_TEMPERATURE};

pub struct DefaultsConfig {
    pub temperature: f64,
    pub dangles: i64,
    pub t_min: f64,
    pub t_max: f64,
    pub step: f64,
    pub half_width: usize,
    pub sigma: f64,
    pub tau: f64,
    pub objective: i64,
    pub sample_size: usize,
    pub cutoff: f64,
    pub pf_scale: f64,
    pub max_iterations: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            dangles: 2,
            t_min: 0.0,
            t_max: 100.0,
            step: 1.0,
            half_width: 2,
            sigma: 1.0,
            tau: 1.0,
            objective: 0,
            sample_size: 1000,
            cutoff: 0.25,
            pf_scale: DEFAULT_RESCALING_FACTOR,
            max_iterations: 100,
        }
    }
}
