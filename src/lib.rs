pub mod argsets;
pub mod command;
pub mod config;
pub mod constants;
pub mod copier;
pub mod interfaces;
pub mod models;
