pub mod animation;
pub mod controller;
pub mod logging;
pub mod session;
pub mod surface;
pub mod transition;
