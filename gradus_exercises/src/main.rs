// Exercise generator — CLI entry point.
//
// Generates a cantus firmus and writes it as a validation-request JSON
// with an empty subject voice for the student to fill in, optionally
// exporting MIDI for playback. Chord and progression drills are available
// behind `--drill`.
//
// Usage:
//   cargo run -p gradus_exercises --bin generate -- [exercise.json]
//     [--seed N] [--mode MODE] [--length N] [--species N] [--measure 3|4]
//     [--octave N] [--midi out.mid] [--drill chords|progression] [--count N]
//
// Modes: dorian, phrygian, lydian, mixolydian, aeolian, ionian

use gradus_exercises::cantus::{CantusSpec, generate_cantus};
use gradus_exercises::drills::{random_chord, random_progression};
use gradus_exercises::midi::write_midi;
use gradus_exercises::mode::{Mode, ModeInstance};
use gradus_protocol::message::ValidationRequest;
use gradus_protocol::types::Species;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("exercise.json");
    let seed: Option<u64> = parse_flag(&args, "--seed");
    let mode_name: String = parse_flag(&args, "--mode").unwrap_or_else(|| "dorian".to_string());
    let length: usize = parse_flag(&args, "--length").unwrap_or(11);
    let species_number: u8 = parse_flag(&args, "--species").unwrap_or(1);
    let measure_beats: u32 = parse_flag(&args, "--measure").unwrap_or(4);
    let octave: i32 = parse_flag(&args, "--octave").unwrap_or(4);
    let midi_path: Option<String> = parse_flag(&args, "--midi");
    let drill: Option<String> = parse_flag(&args, "--drill");
    let count: usize = parse_flag(&args, "--count").unwrap_or(5);

    let mode = parse_mode(&mode_name);
    let species = match Species::try_from(species_number) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Gradus Exercise Generator ===");
    println!("Mode: {:?} (final pc {})", mode.mode, mode.final_pc);
    if let Some(s) = seed {
        println!("Seed: {}", s);
    }
    println!();

    let mut rng = if let Some(s) = seed {
        StdRng::seed_from_u64(s)
    } else {
        StdRng::from_os_rng()
    };

    if let Some(kind) = drill {
        run_drill(&kind, &mode, octave, count, &mut rng);
        return;
    }

    println!("[1/3] Generating cantus firmus ({} measures)...", length);
    let spec = CantusSpec {
        mode,
        octave,
        length,
        measure_beats,
    };
    let cantus = match generate_cantus(&spec, &mut rng) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  Error: {}", e);
            std::process::exit(1);
        }
    };
    let names: Vec<String> = cantus
        .iter()
        .map(|n| gradus_engine::pitch::pitch_name(n.pitch))
        .collect();
    println!("  {}", names.join(" "));

    println!("[2/3] Writing request to {}...", output_path);
    let request = ValidationRequest {
        reference_voice: cantus.clone(),
        subject_voice: Vec::new(),
        species,
    };
    let json = match serde_json::to_string_pretty(&request) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("  Error serializing request: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(output_path, json) {
        eprintln!("  Error writing {}: {}", output_path, e);
        std::process::exit(1);
    }
    println!("  Species {} exercise, subject voice left empty.", species.number());

    match midi_path {
        Some(path) => {
            println!("[3/3] Writing MIDI to {}...", path);
            if let Err(e) = write_midi(&cantus, &[], 72, Path::new(&path)) {
                eprintln!("  Error writing MIDI: {}", e);
                std::process::exit(1);
            }
            println!("  Done.");
        }
        None => println!("[3/3] No MIDI requested."),
    }
}

fn run_drill(kind: &str, mode: &ModeInstance, octave: i32, count: usize, rng: &mut StdRng) {
    match kind {
        "chords" => {
            println!("[1/1] {} chord drills:", count);
            for _ in 0..count {
                let chord = random_chord(48, 72, rng);
                let names: Vec<String> = chord
                    .pitches()
                    .iter()
                    .map(|&p| gradus_engine::pitch::pitch_name(p))
                    .collect();
                println!(
                    "  {} {}: {}",
                    gradus_engine::pitch::pitch_name(chord.root),
                    chord.quality.name(),
                    names.join(" ")
                );
            }
        }
        "progression" => {
            println!("[1/1] {} progression drills:", count);
            for _ in 0..count {
                let prog = random_progression(mode, octave, rng);
                let degrees: Vec<String> =
                    prog.iter().map(|t| (t.degree + 1).to_string()).collect();
                println!("  degrees {}", degrees.join("-"));
            }
        }
        other => {
            eprintln!("Unknown drill '{}'. Use: chords, progression", other);
            std::process::exit(1);
        }
    }
}

fn parse_mode(name: &str) -> ModeInstance {
    match Mode::from_name(name) {
        Some(mode) => {
            let final_pc = ModeInstance::common()
                .iter()
                .find(|&&(m, _)| m == mode)
                .map(|&(_, pc)| pc)
                .unwrap_or(2);
            ModeInstance::new(mode, final_pc)
        }
        None => {
            eprintln!("Unknown mode '{}'. Using D Dorian.", name);
            ModeInstance::d_dorian()
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
