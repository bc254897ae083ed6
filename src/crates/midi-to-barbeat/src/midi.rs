use anyhow::{bail, Context, Result};
use barbeat_core::NoteEvent;
use log::{debug, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

/// Notes from one channel of one MIDI track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub index: usize,
    pub channel: u8,
    pub name: Option<String>,
    pub notes: Vec<NoteEvent>,
}

impl TrackInfo {
    /// Track name, falling back to its 1-based position in the file
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Track {}", self.index + 1),
        }
    }
}

pub struct MidiData {
    pub ticks_per_beat: u32,
    /// First time signature found in the file, as (numerator, denominator)
    pub time_signature: Option<(u32, u32)>,
    pub tracks: Vec<TrackInfo>,
}

impl MidiData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read MIDI file: {}", path.display()))?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)
            .context("Failed to parse MIDI file")?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int() as u32,
            Timing::Timecode(fps, subframe) => {
                // Convert timecode to ticks per beat approximation
                (fps.as_f32() * subframe as f32 * 4.0) as u32
            }
        };
        if ticks_per_beat == 0 {
            bail!("MIDI file declares zero ticks per beat");
        }

        let time_signature = Self::extract_time_signature(&smf);
        debug!("{} ticks per beat, time signature {:?}", ticks_per_beat, time_signature);

        let mut tracks = Vec::new();
        for (index, track) in smf.tracks.iter().enumerate() {
            tracks.extend(collect_track(index, track, ticks_per_beat));
        }

        Ok(MidiData {
            ticks_per_beat,
            time_signature,
            tracks,
        })
    }

    fn extract_time_signature(smf: &Smf) -> Option<(u32, u32)> {
        for track in &smf.tracks {
            for event in track {
                if let TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, power, _, _)) =
                    event.kind
                {
                    let denominator = 2u32.checked_pow(power as u32)?;
                    return Some((numerator as u32, denominator));
                }
            }
        }
        None
    }
}

/// Pair note-on with note-off per channel and key, oldest first.
fn collect_track(index: usize, track: &[TrackEvent], ticks_per_beat: u32) -> Vec<TrackInfo> {
    let mut tick: u64 = 0;
    let mut name: Option<String> = None;
    let mut open: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();
    let mut notes_by_channel: BTreeMap<u8, Vec<NoteEvent>> = BTreeMap::new();

    for event in track {
        tick += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        open.entry((channel, key.as_int()))
                            .or_default()
                            .push_back((tick, vel.as_int()));
                    }
                    // Note-on with velocity 0 is a note-off
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let started = open
                            .get_mut(&(channel, key.as_int()))
                            .and_then(|pending| pending.pop_front());
                        if let Some((start, velocity)) = started {
                            notes_by_channel
                                .entry(channel)
                                .or_default()
                                .push(note(key.as_int(), start, tick, velocity, ticks_per_beat));
                        }
                    }
                    _ => {}
                }
            }
            TrackEventKind::Meta(MetaMessage::TrackName(raw)) => {
                if let Ok(name_str) = std::str::from_utf8(raw) {
                    // Clean track name: trim null bytes and whitespace
                    let cleaned = name_str.trim_end_matches('\0').trim();
                    if !cleaned.is_empty() {
                        name = Some(cleaned.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    for ((channel, key), pending) in open {
        for (start, velocity) in pending {
            warn!(
                "track {}: note {} on channel {} never released, closing at track end",
                index,
                key,
                channel + 1
            );
            notes_by_channel
                .entry(channel)
                .or_default()
                .push(note(key, start, tick, velocity, ticks_per_beat));
        }
    }

    notes_by_channel
        .into_iter()
        .map(|(channel, mut notes)| {
            notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time).then(a.pitch.cmp(&b.pitch)));
            TrackInfo {
                index,
                channel,
                name: name.clone(),
                notes,
            }
        })
        .collect()
}

fn note(key: u8, start: u64, end: u64, velocity: u8, ticks_per_beat: u32) -> NoteEvent {
    let ticks_per_beat = ticks_per_beat as f64;
    NoteEvent::new(
        key,
        start as f64 / ticks_per_beat,
        end.saturating_sub(start) as f64 / ticks_per_beat,
        velocity as f64,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use midly::num::{u15, u28, u4, u7};
    use midly::{Format, Header};

    pub(crate) fn midi_event(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    pub(crate) fn note_on(delta: u32, channel: u8, key: u8, vel: u8) -> TrackEvent<'static> {
        midi_event(delta, channel, MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(vel) })
    }

    pub(crate) fn note_off(delta: u32, channel: u8, key: u8) -> TrackEvent<'static> {
        midi_event(delta, channel, MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) })
    }

    pub(crate) fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(message),
        }
    }

    pub(crate) fn write_smf(tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let format = if tracks.len() == 1 { Format::SingleTrack } else { Format::Parallel };
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(480))));
        for mut track in tracks {
            track.push(meta(0, MetaMessage::EndOfTrack));
            smf.tracks.push(track);
        }
        let mut data = Vec::new();
        smf.write_std(&mut data).unwrap();
        data
    }

    #[test]
    fn test_notes_in_beats() {
        let data = write_smf(vec![vec![
            meta(0, MetaMessage::TrackName(b"Piano")),
            note_on(0, 0, 60, 100),
            note_off(480, 0, 60),
            note_on(480, 0, 64, 80),
            // Note-on with zero velocity releases
            note_on(240, 0, 64, 0),
        ]]);

        let midi = MidiData::from_bytes(&data).unwrap();
        assert_eq!(midi.ticks_per_beat, 480);
        assert_eq!(midi.time_signature, None);
        assert_eq!(midi.tracks.len(), 1);

        let track = &midi.tracks[0];
        assert_eq!(track.label(), "Piano");
        assert_eq!(
            track.notes,
            vec![
                NoteEvent::new(60, 0.0, 1.0, 100.0),
                NoteEvent::new(64, 2.0, 0.5, 80.0),
            ]
        );
    }

    #[test]
    fn test_time_signature_meta() {
        let data = write_smf(vec![vec![
            meta(0, MetaMessage::TimeSignature(6, 3, 24, 8)),
            note_on(0, 0, 60, 100),
            note_off(240, 0, 60),
        ]]);
        let midi = MidiData::from_bytes(&data).unwrap();
        assert_eq!(midi.time_signature, Some((6, 8)));
    }

    #[test]
    fn test_overlapping_same_key_pairs_oldest_first() {
        let data = write_smf(vec![vec![
            note_on(0, 0, 60, 100),
            note_on(480, 0, 60, 90),
            note_off(480, 0, 60),
            note_off(480, 0, 60),
        ]]);
        let midi = MidiData::from_bytes(&data).unwrap();
        assert_eq!(
            midi.tracks[0].notes,
            vec![
                NoteEvent::new(60, 0.0, 2.0, 100.0),
                NoteEvent::new(60, 1.0, 2.0, 90.0),
            ]
        );
    }

    #[test]
    fn test_channels_split_and_hanging_notes_closed() {
        let data = write_smf(vec![vec![
            note_on(0, 0, 48, 100),
            note_on(0, 9, 36, 110),
            note_off(240, 9, 36),
            note_on(720, 9, 38, 100),
        ]]);
        let midi = MidiData::from_bytes(&data).unwrap();
        assert_eq!(midi.tracks.len(), 2);

        assert_eq!(midi.tracks[0].channel, 0);
        assert_eq!(midi.tracks[0].label(), "Track 1");
        assert_eq!(midi.tracks[0].notes, vec![NoteEvent::new(48, 0.0, 2.0, 100.0)]);

        assert_eq!(midi.tracks[1].channel, 9);
        assert_eq!(
            midi.tracks[1].notes,
            vec![
                NoteEvent::new(36, 0.0, 0.5, 110.0),
                NoteEvent::new(38, 2.0, 0.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(MidiData::from_bytes(b"not a midi file").is_err());
    }
}
