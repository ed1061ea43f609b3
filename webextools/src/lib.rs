pub mod cli;
pub mod commands;
pub mod configuration;
pub mod domain;
pub mod error;
pub mod startup;
pub mod telemetry;
pub mod token;
