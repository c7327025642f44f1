mod controller;
mod cycle;

pub use controller::{CycleController, Phase, Transition};
pub use cycle::CyclePlan;
