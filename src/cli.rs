//! Command line interface for hammerdrift

use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::ensemble::{FailurePolicy, run_ensemble};
use crate::error::SimulationError;
use crate::output::TableWriter;
use crate::physics::integrators::IntegratorRegistry;
use crate::physics::trajectory::integrate_trajectory;
use crate::resources::entropy_seed;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded or written
    ConfigLoad(String),
    /// Invalid integrator name provided
    InvalidIntegrator(String),
    /// Integration failed or the configuration was rejected by the model
    Simulation(SimulationError),
    /// Tables could not be written
    Output(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidIntegrator(msg) => write!(f, "Invalid integrator: {msg}"),
            CliError::Simulation(err) => write!(f, "Simulation failed: {err}"),
            CliError::Output(err) => write!(f, "Failed to write output: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Simulation(err) => Some(err),
            CliError::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SimulationError> for CliError {
    fn from(err: SimulationError) -> Self {
        CliError::Simulation(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Output(err)
    }
}

/// hammerdrift - kicked action-angle rotor integrator
#[derive(Parser, Debug)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Time step (overrides config file)
    #[arg(long, value_name = "DT", global = true)]
    pub time_step: Option<f64>,

    /// Final time of the integration (overrides config file)
    #[arg(long, value_name = "T", global = true)]
    pub final_time: Option<f64>,

    /// Integrator type (e.g., kick_drift_kick, symplectic_euler)
    #[arg(short = 'i', long, value_name = "TYPE", global = true)]
    pub integrator: Option<String>,

    /// Directory for output tables (overrides config file)
    #[arg(short = 'o', long, value_name = "PATH", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Fixed number of decimals in output tables
    #[arg(long, value_name = "DIGITS", global = true)]
    pub precision: Option<usize>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub write_config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Integrate one trajectory
    Single {
        /// Initial angle (overrides config file)
        #[arg(long, value_name = "THETA", allow_negative_numbers = true)]
        theta: Option<f64>,

        /// Initial action (overrides config file)
        #[arg(long, value_name = "J", allow_negative_numbers = true)]
        action: Option<f64>,
    },
    /// Integrate an ensemble of uniformly drawn initial conditions
    Ensemble {
        /// Number of particles (overrides config file)
        #[arg(short = 'n', long, value_name = "COUNT")]
        particles: Option<usize>,

        /// Random seed for drawing initial conditions
        #[arg(short = 's', long, value_name = "SEED")]
        seed: Option<u64>,

        /// Record failed particles and keep going instead of aborting
        #[arg(long)]
        continue_on_failure: bool,

        /// Integrate particles on the calling thread only
        #[arg(long)]
        sequential: bool,
    },
}

/// Handles the --list-integrators flag by printing available integrators
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::new().with_standard_integrators();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads layered configuration, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = SimulationConfig::load(args.config.as_deref())
        .map_err(|err| CliError::ConfigLoad(err.to_string()))?;

    if let Some(dt) = args.time_step {
        info!("Overriding time step to: {dt}");
        config.integration.time_step = dt;
    }

    if let Some(t_final) = args.final_time {
        info!("Overriding final time to: {t_final}");
        config.integration.final_time = t_final;
    }

    if let Some(integrator_type) = &args.integrator {
        info!("Using integrator: {integrator_type}");
        config.integration.integrator = integrator_type.clone();
    }

    // names from the config file are checked too, not only --integrator
    IntegratorRegistry::new()
        .with_standard_integrators()
        .create(&config.integration.integrator)
        .map_err(CliError::InvalidIntegrator)?;

    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }

    if let Some(precision) = args.precision {
        config.output.precision = Some(precision);
    }

    match &args.command {
        Some(Command::Single { theta, action }) => {
            if let Some(theta) = theta {
                config.initial.theta = *theta;
            }
            if let Some(action) = action {
                config.initial.action = *action;
            }
        }
        Some(Command::Ensemble {
            particles,
            seed,
            continue_on_failure,
            sequential,
        }) => {
            if let Some(particles) = particles {
                info!("Overriding particle count to: {particles}");
                config.ensemble.particles = *particles;
            }
            if let Some(seed) = seed {
                config.ensemble.seed = Some(*seed);
            }
            if *continue_on_failure {
                config.ensemble.failure_policy = FailurePolicy::Continue;
            }
            if *sequential {
                config.ensemble.parallel = false;
            }
        }
        None => {}
    }

    Ok(config)
}

fn table_writer(config: &SimulationConfig) -> TableWriter {
    if config.output.timestamped {
        TableWriter::timestamped(&config.output.directory, config.output.precision)
    } else {
        TableWriter::new(&config.output.directory, config.output.precision)
    }
}

/// Integrates one trajectory from the configured initial condition and writes it
pub fn run_single(config: &SimulationConfig) -> Result<Vec<PathBuf>, CliError> {
    let (grid, model) = config.build_model()?;
    for event in model.kicks.unreachable_on(&grid) {
        warn!(
            "Kick at t = {} is not within tolerance of any grid point and will never fire",
            event.time
        );
    }

    let integrator = IntegratorRegistry::new()
        .with_standard_integrators()
        .create(&config.integration.integrator)
        .map_err(CliError::InvalidIntegrator)?;

    let initial = config.initial_state();
    info!(
        "Integrating single trajectory from theta = {}, J = {} over {} steps with {}",
        initial.theta,
        initial.action,
        grid.len() - 1,
        integrator.name()
    );

    let trajectory = integrate_trajectory(initial, &grid, &model, integrator.as_ref())?;
    Ok(table_writer(config).write_single(&grid, &trajectory)?)
}

/// Draws and integrates the configured ensemble, then writes it
pub fn run_ensemble_command(config: &SimulationConfig) -> Result<Vec<PathBuf>, CliError> {
    let (grid, model) = config.build_model()?;
    for event in model.kicks.unreachable_on(&grid) {
        warn!(
            "Kick at t = {} is not within tolerance of any grid point and will never fire",
            event.time
        );
    }

    let integrator = IntegratorRegistry::new()
        .with_standard_integrators()
        .create(&config.integration.integrator)
        .map_err(CliError::InvalidIntegrator)?;
    let sampler = config.sampler()?;

    let seed = match config.ensemble.seed {
        Some(seed) => seed,
        None => {
            let seed = entropy_seed();
            info!("No seed given; drew {seed} from entropy (pass --seed {seed} to replay)");
            seed
        }
    };

    let settings = config.ensemble_settings(seed);
    info!(
        "Running ensemble of {} particles (seed {}, {}, {:?} on failure)",
        settings.particles,
        seed,
        integrator.name(),
        settings.failure_policy
    );

    let ensemble = run_ensemble(&settings, &sampler, &grid, &model, integrator.as_ref())?;
    if !ensemble.is_complete() {
        warn!(
            "{} of {} particles failed",
            ensemble.failures().len(),
            settings.particles
        );
    }

    Ok(table_writer(config).write_ensemble(&ensemble)?)
}

/// Dispatches a parsed command line
pub fn run(args: &Args) -> Result<(), CliError> {
    if args.list_integrators {
        handle_list_integrators();
        return Ok(());
    }

    let config = load_and_apply_config(args)?;

    if let Some(path) = &args.write_config {
        config
            .save(path)
            .map_err(|err| CliError::ConfigLoad(err.to_string()))?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let paths = match args.command.clone().unwrap_or(Command::Single {
        theta: None,
        action: None,
    }) {
        Command::Single { .. } => run_single(&config)?,
        Command::Ensemble { .. } => run_ensemble_command(&config)?,
    };

    for path in paths {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
