pub mod plans;
pub mod suggestions;
