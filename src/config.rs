use crate::ensemble::{EnsembleSettings, FailurePolicy, SamplingDomain, UniformSampler};
use crate::error::SimulationResult;
use crate::physics::components::PhaseState;
use crate::physics::dynamics::{HammerModel, RotationLaw};
use crate::physics::grid::TimeGrid;
use crate::physics::integrators::DEFAULT_INTEGRATOR;
use crate::physics::kicks::{DEFAULT_TOLERANCE_FRACTION, KickEvent, KickSchedule, two_hammer_events};
use crate::physics::math::{Scalar, TAU};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix for environment overrides, e.g. `HAMMERDRIFT__ENSEMBLE__PARTICLES=100`
pub const ENV_PREFIX: &str = "HAMMERDRIFT";

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub integration: IntegrationConfig,
    pub dynamics: DynamicsConfig,
    pub kicks: Vec<KickEvent>,
    pub initial: InitialConfig,
    pub ensemble: EnsembleConfig,
    pub output: OutputConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            integration: IntegrationConfig::default(),
            dynamics: DynamicsConfig::default(),
            kicks: two_hammer_events(),
            initial: InitialConfig::default(),
            ensemble: EnsembleConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IntegrationConfig {
    pub time_step: Scalar,
    pub final_time: Scalar,
    pub integrator: String,
    /// Kick window half-width as a fraction of `time_step`
    pub kick_tolerance: Scalar,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            final_time: 300.0,
            integrator: DEFAULT_INTEGRATOR.to_string(),
            kick_tolerance: DEFAULT_TOLERANCE_FRACTION,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DynamicsConfig {
    pub omega_scale: Scalar,
    pub omega_stiffness: Scalar,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            omega_scale: RotationLaw::DEFAULT_SCALE,
            omega_stiffness: RotationLaw::DEFAULT_STIFFNESS,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    pub theta: Scalar,
    pub action: Scalar,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            theta: 0.13,
            action: 5.1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EnsembleConfig {
    pub particles: usize,
    pub theta_max: Scalar,
    pub action_max: Scalar,
    /// Fixed seed; drawn from OS entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
    pub parallel: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            particles: 10,
            theta_max: TAU,
            action_max: SamplingDomain::DEFAULT_ACTION_MAX,
            seed: None,
            failure_policy: FailurePolicy::Abort,
            parallel: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Fixed decimal places; shortest lossless form when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,
    /// Write into a fresh `run-<timestamp>` subdirectory
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            precision: None,
            timestamped: false,
        }
    }
}

impl SimulationConfig {
    /// Layered load: defaults, then the user config file, then `path` (which
    /// must exist when given), then `HAMMERDRIFT__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(user_path) = Self::user_config_path() {
            debug!("Checking user config at {}", user_path.display());
            builder = builder.add_source(
                config::File::from(user_path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `<platform config dir>/hammerdrift/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hammerdrift")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn time_grid(&self) -> SimulationResult<TimeGrid> {
        TimeGrid::new(self.integration.time_step, self.integration.final_time)
    }

    pub fn kick_schedule(&self, grid: &TimeGrid) -> SimulationResult<KickSchedule> {
        KickSchedule::for_grid(self.kicks.clone(), grid, self.integration.kick_tolerance)
    }

    pub fn rotation_law(&self) -> SimulationResult<RotationLaw> {
        RotationLaw::new(self.dynamics.omega_scale, self.dynamics.omega_stiffness)
    }

    /// Grid and model, validated together before any integration starts
    pub fn build_model(&self) -> SimulationResult<(TimeGrid, HammerModel)> {
        let grid = self.time_grid()?;
        let kicks = self.kick_schedule(&grid)?;
        let rotation = self.rotation_law()?;
        Ok((grid, HammerModel::new(rotation, kicks)))
    }

    pub fn initial_state(&self) -> PhaseState {
        PhaseState::new(self.initial.theta, self.initial.action)
    }

    pub fn sampler(&self) -> SimulationResult<UniformSampler> {
        SamplingDomain::new(self.ensemble.theta_max, self.ensemble.action_max)
            .map(UniformSampler::new)
    }

    /// Ensemble settings with the given seed (the caller owns seeding policy)
    pub fn ensemble_settings(&self, seed: u64) -> EnsembleSettings {
        EnsembleSettings::new(self.ensemble.particles, seed)
            .with_failure_policy(self.ensemble.failure_policy)
            .with_parallel(self.ensemble.parallel)
    }
}
