pub mod camera_session;
pub mod controller;
pub mod events;
pub mod worker;
