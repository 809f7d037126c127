mod region;

pub use region::{PayFrequency, Region};
