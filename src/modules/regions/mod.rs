// Regions module

pub mod models;

pub use models::{PayFrequency, Region};
