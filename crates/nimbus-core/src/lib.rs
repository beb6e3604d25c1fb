pub mod observation;

pub use observation::{Observation, capitalize_description, kelvin_to_celsius};
