/// General MIDI percussion lives on channel 10 (index 9)
pub const GM_DRUM_CHANNEL: u8 = 9;

/// Detect if a track name suggests it's a drum track
pub fn is_drum_track_name(track_name: &str) -> bool {
    let name_lower = track_name.to_lowercase();

    let drum_keywords = [
        "kick", "bass drum",
        "snare",
        "hat", "hihat", "hi-hat",
        "cymbal", "crash", "ride",
        "tom",
        "perc",
        "drum",
        "clap", "snap",
        "rimshot",
        "cowbell", "clave",
        "shaker", "tambourine", "maracas",
        "bongo", "conga", "timbale",
    ];

    drum_keywords.iter().any(|&keyword| name_lower.contains(keyword))
}

/// Drum content is on the GM channel, a forced channel, or (optionally) named like drums
pub fn is_drum_track(
    channel: u8,
    name: Option<&str>,
    forced_channels: &[u8],
    detect_names: bool,
) -> bool {
    channel == GM_DRUM_CHANNEL
        || forced_channels.contains(&channel)
        || (detect_names && name.map(is_drum_track_name).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drum_track_names() {
        assert!(is_drum_track_name("Drums"));
        assert!(is_drum_track_name("Closed Hi-Hat"));
        assert!(is_drum_track_name("SNARE 2"));
        assert!(!is_drum_track_name("Piano"));
        assert!(!is_drum_track_name("Lead Synth"));
    }

    #[test]
    fn test_drum_track_detection() {
        assert!(is_drum_track(9, None, &[], false));
        assert!(is_drum_track(3, None, &[3], false));
        assert!(is_drum_track(0, Some("Kick"), &[], true));
        assert!(!is_drum_track(0, Some("Kick"), &[], false));
        assert!(!is_drum_track(0, Some("Bass"), &[], true));
    }
}
