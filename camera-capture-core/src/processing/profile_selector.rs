//! Recording profile selection from the profiles a device advertises.

use std::time::Duration;

use crate::models::config::MediaQuality;
use crate::models::recording_profile::{ProfileQuality, RecordingProfile};

/// Device profile quality a configured tier asks for first.
pub fn profile_quality_for(quality: MediaQuality) -> ProfileQuality {
    match quality {
        MediaQuality::Lowest => ProfileQuality::Low,
        MediaQuality::Low => ProfileQuality::P480,
        MediaQuality::Medium => ProfileQuality::P720,
        MediaQuality::High => ProfileQuality::P1080,
        MediaQuality::Highest | MediaQuality::Auto => ProfileQuality::High,
    }
}

/// Approximate container size in bytes for `duration` of `profile`.
///
/// Saturates at `u64::MAX / 8` for absurd durations.
pub fn approximate_video_size(profile: &RecordingProfile, duration: Duration) -> u64 {
    let bits_per_second = profile.video_bit_rate as u64 + profile.audio_bit_rate as u64;
    bits_per_second.saturating_mul(duration.as_secs().max(1)) / 8
}

/// Video bit rate needed to fit `duration` into `max_file_size` bytes.
pub fn minimum_required_bit_rate(
    profile: &RecordingProfile,
    max_file_size: u64,
    duration: Duration,
) -> u64 {
    let total = max_file_size.saturating_mul(8) / duration.as_secs().max(1);
    total.saturating_sub(profile.audio_bit_rate as u64)
}

/// Profile for a fixed tier, stepping down when the device lacks it.
pub fn select_for_quality<F>(quality: MediaQuality, lookup: F) -> Option<RecordingProfile>
where
    F: Fn(ProfileQuality) -> Option<RecordingProfile>,
{
    let wanted = profile_quality_for(quality);
    if let Some(profile) = lookup(wanted) {
        return Some(profile);
    }
    let fallback = wanted.lower().find_map(&lookup);
    if let Some(ref profile) = fallback {
        log::warn!("No {:?} recording profile, using {:?}", wanted, profile.quality);
    }
    fallback
}

/// Best profile that can hold `min_duration` within `max_file_size`.
///
/// Walks qualities best-first. A profile qualifies when its approximate size
/// fits, or when lowering its video bit rate to the required rate keeps it
/// within a quarter of the original. Without a size budget the best profile
/// wins. When nothing qualifies, the lowest advertised profile is used.
pub fn select_auto<F>(
    max_file_size: Option<u64>,
    min_duration: Duration,
    lookup: F,
) -> Option<RecordingProfile>
where
    F: Fn(ProfileQuality) -> Option<RecordingProfile>,
{
    let available: Vec<RecordingProfile> = ProfileQuality::DESCENDING
        .into_iter()
        .filter_map(&lookup)
        .collect();

    let Some(max_file_size) = max_file_size else {
        return available.first().copied();
    };

    for profile in &available {
        if approximate_video_size(profile, min_duration) <= max_file_size {
            return Some(*profile);
        }
        let required = minimum_required_bit_rate(profile, max_file_size, min_duration);
        let original = profile.video_bit_rate as u64;
        if required >= original / 4 && required <= original {
            let mut adjusted = *profile;
            adjusted.video_bit_rate = required as u32;
            log::debug!(
                "Lowered {:?} video bit rate {} -> {} to fit {} bytes",
                profile.quality,
                original,
                required,
                max_file_size
            );
            return Some(adjusted);
        }
    }

    let lowest = available.last().copied();
    if let Some(ref profile) = lowest {
        log::warn!(
            "No profile fits {} bytes in {:?}, using {:?}",
            max_file_size,
            min_duration,
            profile.quality
        );
    }
    lowest
}

/// Resolve the recording profile for the configured tier.
pub fn select_recording_profile<F>(
    quality: MediaQuality,
    max_file_size: Option<u64>,
    min_duration: Duration,
    lookup: F,
) -> Option<RecordingProfile>
where
    F: Fn(ProfileQuality) -> Option<RecordingProfile>,
{
    match quality {
        MediaQuality::Auto => select_auto(max_file_size, min_duration, lookup),
        tier => select_for_quality(tier, lookup),
    }
}
