//! System diagnostics and dependency checking.
//!
//! Verifies that the external media tools are installed and runnable.

use crate::config::Config;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working, with its first version line
    Ok(String),
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Run `<binary> -version` and report what happened.
pub fn check_tool(binary: &str) -> CheckResult {
    match Command::new(binary).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            CheckResult::Ok(first_line(&stdout))
        }
        Ok(_) => CheckResult::Warning(format!("'{}' found but -version failed", binary)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", binary, e)),
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}

/// Check every external tool the configuration points at and print results.
///
/// Returns true when everything needed for a run is available.
pub fn check_dependencies(config: &Config) -> bool {
    println!("callstitch {}", crate::version_string());
    println!("Checking system dependencies...\n");

    let mut all_ok = true;
    for (label, binary) in [
        ("ffprobe (durations)", config.tools.ffprobe.as_str()),
        ("ffmpeg (merging)", config.tools.ffmpeg.as_str()),
    ] {
        print!("{}: ", label);
        match check_tool(binary) {
            CheckResult::Ok(version) => println!("✓ OK ({})", version),
            CheckResult::NotFound => {
                all_ok = false;
                println!("✗ NOT FOUND ({})", binary);
                println!("  Install: sudo apt install ffmpeg  (Debian/Ubuntu)");
                println!("           sudo pacman -S ffmpeg    (Arch)");
                println!("           brew install ffmpeg      (macOS)");
            }
            CheckResult::Warning(msg) => {
                all_ok = false;
                println!("⚠ WARNING: {}", msg);
            }
        }
    }

    print!("output directory: ");
    match std::fs::create_dir_all(&config.paths.output_dir) {
        Ok(()) => println!("✓ OK ({})", config.paths.output_dir.display()),
        Err(e) => {
            all_ok = false;
            println!(
                "✗ cannot create {}: {}",
                config.paths.output_dir.display(),
                e
            );
        }
    }

    print!("input directory: ");
    if config.paths.input_dir.is_dir() {
        println!("✓ OK ({})", config.paths.input_dir.display());
    } else {
        all_ok = false;
        println!("✗ missing ({})", config.paths.input_dir.display());
    }

    all_ok
}
