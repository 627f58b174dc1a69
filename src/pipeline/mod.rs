pub mod inference;
pub mod extraction;
pub mod normalization;
pub mod specialists; // Condition evaluators + concurrent dispatch
pub mod synthesis;
pub mod critique;
pub mod orchestrator;

pub use orchestrator::*;
