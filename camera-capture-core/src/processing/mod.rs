pub mod orientation;
pub mod profile_selector;
pub mod size_negotiator;
