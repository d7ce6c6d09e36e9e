pub mod frequencies;
pub mod roller;
pub mod validation;
