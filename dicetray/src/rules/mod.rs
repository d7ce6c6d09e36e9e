pub mod dice;
pub mod layout;
pub mod outcome;
