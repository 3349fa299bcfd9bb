//! Action-angle dynamics under impulsive forcing

pub mod components;
pub mod dynamics;
pub mod grid;
pub mod integrators;
pub mod kicks;
pub mod math;
pub mod trajectory;
