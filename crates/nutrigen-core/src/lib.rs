//! Core library for nutrigen: profile model, weekly plan model and store,
//! planner interface, and the generation and swap flows.

pub mod agent;
pub mod collaborator;
pub mod controller;
pub mod export;
pub mod flow;
pub mod plan;
pub mod profile;

pub use controller::Controller;
