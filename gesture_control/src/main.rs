//! gesture_control: command-line entry point.

use clap::Parser;

use gesture_control::app::run;
use gesture_control::logging;
use gesture_control::settings::{Args, Settings, SourceKind};

fn main() {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    settings.apply_args(&args);

    logging::init(settings.debug_logging);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Smart Gesture Control: slides, volume, cursor         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match settings.source {
        SourceKind::Sim => {
            println!("  Mode: Keyboard simulation  (1-9/0 poses, C cursor, P pinch, Space release)");
        }
        SourceKind::Stdin   => println!("  Mode: detector JSON lines on stdin"),
        SourceKind::Command => println!(
            "  Mode: detector command `{}`",
            settings.detector_command.as_deref().unwrap_or("")
        ),
        SourceKind::Leap => println!("  Mode: LeapMotion hardware"),
    }
    if settings.dry_run {
        println!("  Dry run: no keys or mouse events will be injected");
    }
    println!();

    if let Err(e) = run(settings) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
