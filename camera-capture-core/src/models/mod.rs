pub mod camera_models;
pub mod capture_result;
pub mod config;
pub mod error;
pub mod events;
pub mod recording_profile;
pub mod rotation;
pub mod size;
pub mod state;
