//! The fixed fallback ladders of download attempt specifications.

/// One fallback tier: a yt-dlp format selector, an optional merge container,
/// an optional audio-extraction codec, and a human-readable description
/// reported back to the user on success.
///
/// The sets of tiers are fixed at process start and never mutated at
/// runtime; tiers are tried strictly in declared order with no scoring or
/// dynamic reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptSpec {
    /// yt-dlp `--format` selector (quality ceiling included).
    pub format: &'static str,
    /// Container passed to `--merge-output-format` when separate audio and
    /// video streams must be merged.
    pub merge_container: Option<&'static str>,
    /// Codec passed to `--extract-audio --audio-format` for audio-only
    /// delivery.
    pub extract_audio: Option<&'static str>,
    /// Human-readable description of this tier.
    pub description: &'static str,
}

/// The video fallback ladder, highest desired quality first, ending in a
/// catch-all.
const LADDER: [AttemptSpec; 4] = [
    AttemptSpec {
        format: "bestvideo[height<=720]+bestaudio/best[height<=720]",
        merge_container: Some("mp4"),
        extract_audio: None,
        description: "Best quality (720p max) with audio merge",
    },
    AttemptSpec {
        format: "best[height<=720]",
        merge_container: None,
        extract_audio: None,
        description: "Single file best quality (720p max)",
    },
    AttemptSpec {
        format: "bestvideo[height<=480]+bestaudio/best[height<=480]",
        merge_container: Some("mp4"),
        extract_audio: None,
        description: "Medium quality (480p max) with audio merge",
    },
    AttemptSpec {
        format: "best",
        merge_container: None,
        extract_audio: None,
        description: "Any available format",
    },
];

/// The audio fallback ladder: best audio stream first, then audio extracted
/// from whatever full format is available.
const AUDIO_LADDER: [AttemptSpec; 2] = [
    AttemptSpec {
        format: "bestaudio/best",
        merge_container: None,
        extract_audio: Some("mp3"),
        description: "Audio only (mp3)",
    },
    AttemptSpec {
        format: "best",
        merge_container: None,
        extract_audio: Some("mp3"),
        description: "Audio extracted from best available format (mp3)",
    },
];

/// Returns the ordered video fallback ladder.
pub fn ladder() -> &'static [AttemptSpec] {
    &LADDER
}

/// Returns the ordered audio fallback ladder.
pub fn audio_ladder() -> &'static [AttemptSpec] {
    &AUDIO_LADDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_order() {
        let tiers = ladder();
        assert_eq!(tiers.len(), 4);
        // Quality ceilings descend towards the catch-all
        assert!(tiers[0].format.contains("720"));
        assert!(tiers[2].format.contains("480"));
        assert_eq!(tiers[3].format, "best");
    }

    #[test]
    fn test_merge_tiers_name_a_container() {
        for tier in ladder() {
            if tier.format.contains('+') {
                assert!(tier.merge_container.is_some(), "merged tier without container: {tier:?}");
            }
        }
    }

    #[test]
    fn test_video_tiers_never_extract_audio() {
        for tier in ladder() {
            assert!(tier.extract_audio.is_none(), "video tier with audio codec: {tier:?}");
        }
    }

    #[test]
    fn test_audio_ladder_extracts_mp3_on_every_tier() {
        let tiers = audio_ladder();
        assert_eq!(tiers.len(), 2);
        for tier in tiers {
            assert_eq!(tier.extract_audio, Some("mp3"), "tier without codec: {tier:?}");
            assert!(tier.merge_container.is_none());
        }
        assert_eq!(tiers[1].format, "best");
    }
}
