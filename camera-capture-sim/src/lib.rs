//! # camera-capture-sim
//!
//! Simulated camera backend for camera-capture-kit.
//!
//! Provides:
//! - `SimPlatform`: in-memory `CameraPlatform` with a configurable device table
//! - `SimDevice`: open camera producing synthetic JPEG frames
//! - `SimRecorder`: recorder writing a placeholder container, with size/duration limits
//! - `SimHandle`: fault injection and call inspection for tests
//! - `fixtures`: a typical back + front camera phone
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{CameraConfiguration, CameraSession};
//! use camera_capture_sim::fixtures;
//!
//! let platform = fixtures::standard_platform();
//! let sim = platform.handle();
//! let (session, events) = CameraSession::new(platform, CameraConfiguration::default())?;
//! session.open(fixtures::BACK_CAMERA_ID)?;
//! ```

pub mod fixtures;
pub mod sim_device;
pub mod sim_platform;
pub mod sim_recorder;

pub use sim_device::{synthetic_jpeg, SimDevice};
pub use sim_platform::{SimCall, SimCamera, SimFaults, SimHandle, SimPlatform, SimState};
pub use sim_recorder::{RecorderPhase, SimRecorder};
