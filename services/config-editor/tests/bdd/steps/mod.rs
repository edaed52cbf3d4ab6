//! BDD step definitions for the configuration editor

pub mod editing_steps;
pub mod navigation_steps;
