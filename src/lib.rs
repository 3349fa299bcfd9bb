//! hammerdrift library
//!
//! Kick-drift-kick integration of a rotor in action-angle variables that is
//! struck by impulsive "hammer" kicks at scheduled times, for single
//! trajectories and seeded Monte Carlo ensembles.

pub mod cli;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod output;
pub mod physics;
pub mod prelude;
pub mod resources;
