//! Device tables for tests and the demo, modelled on a typical phone: a
//! back camera mounted at 90° and a front camera mounted at 270°.

use camera_capture_core::models::camera_models::{
    CameraInfo, CameraParameters, Facing, FlashMode, FocusMode,
};
use camera_capture_core::models::recording_profile::{
    AudioCodec, ContainerFormat, ProfileQuality, RecordingProfile, VideoCodec,
};
use camera_capture_core::models::rotation::Rotation;
use camera_capture_core::models::size::Size;

use crate::sim_platform::{SimCamera, SimPlatform};

pub const BACK_CAMERA_ID: u32 = 0;
pub const FRONT_CAMERA_ID: u32 = 1;

pub fn profile(
    quality: ProfileQuality,
    width: u32,
    height: u32,
    video_bit_rate: u32,
) -> RecordingProfile {
    RecordingProfile {
        quality,
        file_format: ContainerFormat::Mpeg4,
        video_codec: VideoCodec::H264,
        audio_codec: AudioCodec::Aac,
        video_bit_rate,
        audio_bit_rate: 96_000,
        video_frame_rate: 30,
        video_frame_width: width,
        video_frame_height: height,
        audio_sample_rate: 48_000,
        audio_channels: 1,
    }
}

pub fn standard_profiles() -> Vec<RecordingProfile> {
    vec![
        profile(ProfileQuality::High, 1920, 1080, 17_000_000),
        profile(ProfileQuality::P1080, 1920, 1080, 17_000_000),
        profile(ProfileQuality::P720, 1280, 720, 10_000_000),
        profile(ProfileQuality::P480, 720, 480, 2_500_000),
        RecordingProfile {
            file_format: ContainerFormat::ThreeGpp,
            video_codec: VideoCodec::H263,
            audio_codec: AudioCodec::AmrNb,
            audio_bit_rate: 12_200,
            audio_sample_rate: 8_000,
            video_frame_rate: 15,
            ..profile(ProfileQuality::Low, 176, 144, 192_000)
        },
    ]
}

fn sizes(list: &[(u32, u32)]) -> Vec<Size> {
    list.iter().copied().map(Size::from).collect()
}

pub fn back_camera() -> SimCamera {
    SimCamera {
        info: CameraInfo {
            id: BACK_CAMERA_ID,
            facing: Facing::Back,
            mount: Rotation::Deg90,
        },
        parameters: CameraParameters {
            supported_preview_sizes: sizes(&[
                (1920, 1080),
                (1440, 1080),
                (1280, 720),
                (640, 480),
                (320, 240),
            ]),
            supported_picture_sizes: sizes(&[
                (4032, 3024),
                (4000, 2250),
                (1920, 1080),
                (1280, 960),
                (640, 480),
            ]),
            supported_video_sizes: Some(sizes(&[
                (3840, 2160),
                (1920, 1080),
                (1280, 720),
                (720, 480),
                (176, 144),
            ])),
            supported_focus_modes: vec![
                FocusMode::Auto,
                FocusMode::Macro,
                FocusMode::ContinuousPicture,
                FocusMode::ContinuousVideo,
            ],
            supported_flash_modes: vec![FlashMode::Auto, FlashMode::On, FlashMode::Off],
            video_stabilization_supported: true,
            ..CameraParameters::default()
        },
        profiles: standard_profiles(),
    }
}

/// Fixed-focus selfie camera without flash, on firmware that reports no
/// separate video sizes.
pub fn front_camera() -> SimCamera {
    SimCamera {
        info: CameraInfo {
            id: FRONT_CAMERA_ID,
            facing: Facing::Front,
            mount: Rotation::Deg270,
        },
        parameters: CameraParameters {
            supported_preview_sizes: sizes(&[(1280, 720), (960, 720), (640, 480)]),
            supported_picture_sizes: sizes(&[(2560, 1920), (1920, 1080), (1280, 960)]),
            supported_video_sizes: None,
            supported_focus_modes: vec![FocusMode::Fixed],
            supported_flash_modes: Vec::new(),
            video_stabilization_supported: false,
            ..CameraParameters::default()
        },
        profiles: standard_profiles()
            .into_iter()
            .filter(|p| p.quality != ProfileQuality::P1080)
            .collect(),
    }
}

/// Back and front camera, ids 0 and 1.
pub fn standard_platform() -> SimPlatform {
    SimPlatform::new(vec![back_camera(), front_camera()])
}
