pub mod instruments;
pub mod registry;
pub mod samples;
