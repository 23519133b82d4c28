// MIDI export of an exercise.
//
// Writes a Standard MIDI File (Format 1) with a tempo track plus one track
// per voice, reference first, for the external playback layer. Wire notes
// are contiguous within a voice, so each track is a simple onset-ordered
// note-on/note-off walk.
//
// Uses the `midly` crate for MIDI writing.

use gradus_protocol::types::WireNote;
use midly::{
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Write both voices of an exercise to a MIDI file. The subject voice may
/// be empty (a freshly generated exercise has no counterpoint yet).
pub fn write_midi(
    reference: &[WireNote],
    subject: &[WireNote],
    tempo_bpm: u16,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let smf = exercise_to_smf(reference, subject, tempo_bpm);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Build the in-memory SMF: tempo track plus the two voice tracks.
pub fn exercise_to_smf(
    reference: &[WireNote],
    subject: &[WireNote],
    tempo_bpm: u16,
) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / tempo_bpm.max(1) as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    smf.tracks
        .push(voice_track(reference, "Reference", u4::new(0)));
    smf.tracks.push(voice_track(subject, "Subject", u4::new(1)));

    smf
}

fn beat_tick(beat: f64) -> u32 {
    (beat * TICKS_PER_QUARTER as f64).round() as u32
}

fn voice_track(notes: &[WireNote], name: &'static str, channel: u4) -> Track<'static> {
    let mut track: Track<'static> = Vec::new();

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(name.as_bytes())),
    });

    // Choir aahs, matching the vocal idiom of the exercises.
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(52),
            },
        },
    });

    let mut last_event_tick: u32 = 0;
    for note in notes {
        let key = u7::new(note.pitch.clamp(0, 127) as u8);
        let on_tick = beat_tick(note.onset_beat);
        let off_tick = beat_tick(note.onset_beat + note.duration_beats);

        track.push(TrackEvent {
            delta: u28::new(on_tick.saturating_sub(last_event_tick)),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(80),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(off_tick.saturating_sub(on_tick)),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
        last_event_tick = off_tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    track
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole_notes(pitches: &[i32]) -> Vec<WireNote> {
        pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| WireNote::new(p, i as f64 * 4.0, 4.0))
            .collect()
    }

    #[test]
    fn test_track_shape() {
        let reference = whole_notes(&[62, 65, 64, 62]);
        let subject = whole_notes(&[69, 72, 71, 74]);
        let smf = exercise_to_smf(&reference, &subject, 72);
        // Tempo track + two voice tracks.
        assert_eq!(smf.tracks.len(), 3);
        // Name, program change, 4 on/off pairs, end-of-track.
        assert_eq!(smf.tracks[1].len(), 2 + 8 + 1);
        assert_eq!(smf.tracks[2].len(), 2 + 8 + 1);
    }

    #[test]
    fn test_empty_subject_track() {
        let reference = whole_notes(&[62, 65, 64, 62]);
        let smf = exercise_to_smf(&reference, &[], 72);
        assert_eq!(smf.tracks.len(), 3);
        assert_eq!(smf.tracks[2].len(), 3, "name, program, end-of-track");
    }

    #[test]
    fn test_note_timing_in_ticks() {
        let reference = vec![WireNote::new(62, 0.0, 4.0), WireNote::new(64, 4.0, 2.0)];
        let smf = exercise_to_smf(&reference, &[], 60);
        let deltas: Vec<u32> = smf.tracks[1]
            .iter()
            .map(|ev| ev.delta.as_int())
            .collect();
        // name, program, on(0), off(+1920), on(0), off(+960), eot.
        assert_eq!(deltas, vec![0, 0, 0, 1920, 0, 960, 0]);
    }
}
