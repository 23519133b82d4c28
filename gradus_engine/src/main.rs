// Counterpoint grader — CLI entry point.
//
// Reads a validation request (JSON) from a file or stdin, runs the species
// rule tables, and prints the graded report.
//
// Usage:
//   cargo run -p gradus_engine --bin grade -- [request.json] [--config cfg.json] [--json]
//
// Exit codes: 0 = valid exercise, 1 = musical violations, 2 = malformed request.

use gradus_engine::config::EngineConfig;
use gradus_engine::pitch::pitch_name;
use gradus_engine::validate::validate;
use gradus_protocol::message::ValidationRequest;
use gradus_protocol::types::Severity;
use std::io::Read;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let input_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str());
    let config_path: Option<String> = parse_flag(&args, "--config");
    let json_output = args.iter().any(|a| a == "--json");

    let raw = match read_input(input_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading request: {}", e);
            std::process::exit(2);
        }
    };
    let request: ValidationRequest = match serde_json::from_str(&raw) {
        Ok(req) => req,
        Err(e) => {
            eprintln!("Error parsing request JSON: {}", e);
            std::process::exit(2);
        }
    };

    let config = match config_path {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| EngineConfig::from_json(&s).map_err(|e| e.to_string()))
        {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };

    let report = match validate(&request, &config) {
        Ok(report) => report,
        Err(e) => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&e.to_response()).unwrap_or_default()
                );
            } else {
                eprintln!("Request invalid: {}", e);
            }
            std::process::exit(2);
        }
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else {
        println!("=== Counterpoint Grader ===");
        println!(
            "Species: {}   Measures: {}   Notes: {} vs {}",
            request.species.number(),
            request.reference_voice.len(),
            request.reference_voice.len(),
            request.subject_voice.len()
        );
        println!(
            "Range: {} - {}",
            request
                .subject_voice
                .iter()
                .map(|n| n.pitch)
                .min()
                .map(pitch_name)
                .unwrap_or_default(),
            request
                .subject_voice
                .iter()
                .map(|n| n.pitch)
                .max()
                .map(pitch_name)
                .unwrap_or_default()
        );
        println!();
        if report.violations.is_empty() {
            println!("No violations.");
        } else {
            for v in &report.violations {
                let tag = match v.severity {
                    Severity::Error => "ERROR",
                    Severity::Warning => "warn ",
                };
                println!(
                    "  {} beat {:>5.1}  [{}] {}",
                    tag,
                    v.beat,
                    v.rule.as_str(),
                    v.message
                );
            }
        }
        println!();
        println!(
            "Score: {}/100 ({})",
            report.score,
            if report.is_valid { "PASS" } else { "FAIL" }
        );
    }

    std::process::exit(if report.is_valid { 0 } else { 1 });
}

fn read_input(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
