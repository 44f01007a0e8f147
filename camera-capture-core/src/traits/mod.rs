pub mod camera_device;
pub mod camera_listener;
pub mod camera_platform;
pub mod media_recorder;
