//! Size negotiation against device-reported capability lists.
//!
//! All functions are pure: they only ever return a member of the candidate
//! list they were given, never a synthesized size.

use crate::models::camera_models::CameraParameters;
use crate::models::config::{CameraConfiguration, MediaQuality};
use crate::models::error::CameraError;
use crate::models::recording_profile::{CapabilityProfile, RecordingProfile};
use crate::models::size::Size;

/// Aspect ratios closer than this are treated as equal.
const RATIO_EPSILON: f64 = 1e-3;

/// Resolution ceiling for each bounded quality tier.
pub const LOW_CEILING: Size = Size::new(640, 480);
pub const MEDIUM_CEILING: Size = Size::new(1280, 720);
pub const HIGH_CEILING: Size = Size::new(1920, 1080);

/// Return `primary` unless it is missing or empty, in which case `fallback`.
///
/// Old firmware reports no video sizes at all; recorders then accept the
/// preview sizes.
pub fn with_fallback<'a>(primary: Option<&'a [Size]>, fallback: &'a [Size]) -> &'a [Size] {
    match primary {
        Some(sizes) if !sizes.is_empty() => sizes,
        _ => fallback,
    }
}

/// Pick the candidate whose aspect ratio is closest to `target_width / target_height`.
///
/// An exact size match wins outright. Among candidates with the same ratio
/// distance, the one whose area is closest to the target wins, and the
/// smaller one wins a remaining tie.
pub fn pick_size_by_ratio(
    candidates: &[Size],
    target_width: u32,
    target_height: u32,
) -> Result<Size, CameraError> {
    let target = Size::new(target_width, target_height);
    if candidates.contains(&target) {
        return Ok(target);
    }

    let target_ratio = target.ratio();
    let area_distance = |s: &Size| s.area().abs_diff(target.area());

    let mut best: Option<(Size, f64)> = None;
    for &candidate in candidates {
        let diff = (candidate.ratio() - target_ratio).abs();
        best = match best {
            None => Some((candidate, diff)),
            Some((current, current_diff)) => {
                let better_ratio = diff + RATIO_EPSILON < current_diff;
                let same_ratio = (diff - current_diff).abs() <= RATIO_EPSILON;
                let closer = area_distance(&candidate) < area_distance(&current)
                    || (area_distance(&candidate) == area_distance(&current)
                        && candidate.area() < current.area());
                if better_ratio || (same_ratio && closer) {
                    Some((candidate, diff))
                } else {
                    Some((current, current_diff))
                }
            }
        };
    }

    best.map(|(size, _)| size)
        .ok_or(CameraError::NoSupportedSize("candidate"))
}

/// Pick a size for a quality tier.
///
/// `Highest` and `Lowest` take the largest and smallest candidates. Bounded
/// tiers take the largest candidate that fits their ceiling (exact or next
/// smaller), or the smallest candidate when nothing fits. `Auto` photos use
/// the `High` tier.
pub fn pick_size_by_quality_tier(
    candidates: &[Size],
    tier: MediaQuality,
) -> Result<Size, CameraError> {
    let largest = candidates.iter().copied().max_by_key(Size::area);
    let smallest = candidates.iter().copied().min_by_key(Size::area);

    let ceiling = match tier {
        MediaQuality::Highest => return largest.ok_or(CameraError::NoSupportedSize("candidate")),
        MediaQuality::Lowest => return smallest.ok_or(CameraError::NoSupportedSize("candidate")),
        MediaQuality::Low => LOW_CEILING,
        MediaQuality::Medium => MEDIUM_CEILING,
        MediaQuality::High | MediaQuality::Auto => HIGH_CEILING,
    };

    candidates
        .iter()
        .copied()
        .filter(|s| s.fits_within(ceiling))
        .max_by_key(Size::area)
        .or(smallest)
        .ok_or(CameraError::NoSupportedSize("candidate"))
}

/// Negotiate preview, photo and video sizes for a freshly opened device.
///
/// Only an empty preview list is fatal; picture and video lists fall back
/// to the preview sizes.
pub fn negotiate(
    params: &CameraParameters,
    config: &CameraConfiguration,
    recording: RecordingProfile,
) -> Result<CapabilityProfile, CameraError> {
    let preview_sizes = params.supported_preview_sizes.as_slice();
    if preview_sizes.is_empty() {
        return Err(CameraError::NoSupportedSize("preview"));
    }

    let video_candidates = with_fallback(params.supported_video_sizes.as_deref(), preview_sizes);
    let video_size = pick_size_by_ratio(
        video_candidates,
        recording.video_frame_width,
        recording.video_frame_height,
    )
    .map_err(|_| CameraError::NoSupportedSize("video"))?;

    let picture_candidates =
        with_fallback(Some(params.supported_picture_sizes.as_slice()), preview_sizes);
    let photo_size = pick_size_by_quality_tier(picture_candidates, config.media_quality)
        .map_err(|_| CameraError::NoSupportedSize("picture"))?;

    let ratio_source = if config.media_action.is_photo_oriented() {
        photo_size
    } else {
        video_size
    };
    let preview_size = pick_size_by_ratio(preview_sizes, ratio_source.width, ratio_source.height)
        .map_err(|_| CameraError::NoSupportedSize("preview"))?;

    log::debug!(
        "Negotiated sizes: preview {}, photo {}, video {} ({:?})",
        preview_size,
        photo_size,
        video_size,
        recording.quality
    );

    Ok(CapabilityProfile {
        preview_size,
        photo_size,
        video_size,
        recording,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MediaAction;
    use crate::models::recording_profile::{AudioCodec, ContainerFormat, ProfileQuality, VideoCodec};

    fn sizes(list: &[(u32, u32)]) -> Vec<Size> {
        list.iter().copied().map(Size::from).collect()
    }

    fn profile_1080() -> RecordingProfile {
        RecordingProfile {
            quality: ProfileQuality::P1080,
            file_format: ContainerFormat::Mpeg4,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            video_bit_rate: 17_000_000,
            audio_bit_rate: 96_000,
            video_frame_rate: 30,
            video_frame_width: 1920,
            video_frame_height: 1080,
            audio_sample_rate: 48_000,
            audio_channels: 2,
        }
    }

    #[test]
    fn ratio_exact_match_wins() {
        let candidates = sizes(&[(640, 480), (1920, 1080), (1280, 720)]);
        assert_eq!(pick_size_by_ratio(&candidates, 1920, 1080).unwrap(), Size::new(1920, 1080));
    }

    #[test]
    fn ratio_prefers_closest_aspect() {
        let candidates = sizes(&[(640, 480), (1280, 720), (1024, 768)]);
        // 16:9 target; only 1280x720 shares the ratio.
        assert_eq!(pick_size_by_ratio(&candidates, 3840, 2160).unwrap(), Size::new(1280, 720));
    }

    #[test]
    fn ratio_tie_breaks_by_resolution() {
        let candidates = sizes(&[(640, 480), (2048, 1536), (1024, 768)]);
        // All 4:3, so area distance decides.
        assert_eq!(pick_size_by_ratio(&candidates, 1600, 1200).unwrap(), Size::new(1024, 768));
        assert_eq!(pick_size_by_ratio(&candidates, 2000, 1500).unwrap(), Size::new(2048, 1536));
    }

    #[test]
    fn ratio_always_returns_a_candidate() {
        let candidates = sizes(&[(176, 144), (320, 240), (352, 288), (1280, 720), (1920, 1080)]);
        for (w, h) in [(1, 1), (4000, 3000), (300, 900), (720, 480), (0, 0), (1, 0)] {
            let picked = pick_size_by_ratio(&candidates, w, h).unwrap();
            assert!(candidates.contains(&picked), "{} not in candidates", picked);
        }
    }

    #[test]
    fn ratio_empty_candidates_fail() {
        assert_eq!(
            pick_size_by_ratio(&[], 640, 480),
            Err(CameraError::NoSupportedSize("candidate"))
        );
    }

    #[test]
    fn quality_tiers() {
        let candidates = sizes(&[(320, 240), (640, 480), (1280, 720), (1920, 1080), (4032, 3024)]);
        let pick = |tier| pick_size_by_quality_tier(&candidates, tier).unwrap();
        assert_eq!(pick(MediaQuality::Highest), Size::new(4032, 3024));
        assert_eq!(pick(MediaQuality::Lowest), Size::new(320, 240));
        assert_eq!(pick(MediaQuality::Low), Size::new(640, 480));
        assert_eq!(pick(MediaQuality::Medium), Size::new(1280, 720));
        assert_eq!(pick(MediaQuality::High), Size::new(1920, 1080));
        assert_eq!(pick(MediaQuality::Auto), Size::new(1920, 1080));
    }

    #[test]
    fn quality_tier_takes_next_smaller() {
        let candidates = sizes(&[(800, 600), (2592, 1944)]);
        assert_eq!(
            pick_size_by_quality_tier(&candidates, MediaQuality::High).unwrap(),
            Size::new(800, 600)
        );
    }

    #[test]
    fn quality_tier_falls_back_to_smallest_when_nothing_fits() {
        let candidates = sizes(&[(4032, 3024), (2592, 1944)]);
        assert_eq!(
            pick_size_by_quality_tier(&candidates, MediaQuality::Low).unwrap(),
            Size::new(2592, 1944)
        );
    }

    #[test]
    fn fallback_skips_empty_primary() {
        let preview = sizes(&[(640, 480)]);
        let empty: Vec<Size> = Vec::new();
        assert_eq!(with_fallback(None, &preview), preview.as_slice());
        assert_eq!(with_fallback(Some(&empty), &preview), preview.as_slice());
    }

    #[test]
    fn video_size_falls_back_to_preview_ratio_match() {
        let params = CameraParameters {
            supported_preview_sizes: sizes(&[(640, 480), (1280, 720), (1920, 1080)]),
            supported_picture_sizes: sizes(&[(2592, 1944), (1600, 1200)]),
            supported_video_sizes: Some(Vec::new()),
            ..Default::default()
        };
        let config = CameraConfiguration {
            media_action: MediaAction::Video,
            ..Default::default()
        };
        let profile = negotiate(&params, &config, profile_1080()).unwrap();
        assert_eq!(profile.video_size, Size::new(1920, 1080));
        assert_eq!(profile.preview_size, Size::new(1920, 1080));
        assert!(params.supported_picture_sizes.contains(&profile.photo_size));
    }

    #[test]
    fn photo_session_previews_at_photo_ratio() {
        let params = CameraParameters {
            supported_preview_sizes: sizes(&[(640, 480), (1280, 720)]),
            supported_picture_sizes: sizes(&[(1440, 1080), (4032, 3024)]),
            supported_video_sizes: Some(sizes(&[(1280, 720)])),
            ..Default::default()
        };
        let config = CameraConfiguration {
            media_action: MediaAction::Photo,
            ..Default::default()
        };
        let profile = negotiate(&params, &config, profile_1080()).unwrap();
        assert_eq!(profile.photo_size, Size::new(1440, 1080));
        assert_eq!(profile.preview_size, Size::new(640, 480));
        assert_eq!(profile.video_size, Size::new(1280, 720));
    }

    #[test]
    fn empty_preview_list_is_fatal() {
        let params = CameraParameters::default();
        let err = negotiate(&params, &CameraConfiguration::default(), profile_1080()).unwrap_err();
        assert_eq!(err, CameraError::NoSupportedSize("preview"));
    }
}
