//! Batch driver over `chess_pgn`.
//!
//! Usage: pgn-tool <command> <glob>...
//!
//! Commands:
//!   validate   replay every game and report the first error per game
//!   strip      print mainline-only copies without annotations
//!   optimize   print whitespace/comment-normalized text
//!   export     parse and re-export every game with the configured options
//!   json       dump parsed trees as JSON, one game per line
//!   checksum   print a checksum per game
//!
//! Export behaviour is configured through `PGN_*` environment variables
//! (see `config.rs`); a `.env` file is honoured.
//!
//! Example:
//!   cargo run --release --bin pgn-tool -- validate 'games/*.pgn'

mod config;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use chess_pgn::parser::parse_game_with;
use chess_pgn::rules::ShakmatyEngine;
use chess_pgn::{checksum, export_game, optimize, split_games, strip_annotations, validate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ToolConfig;

const COMMANDS: &[&str] = &["validate", "strip", "optimize", "export", "json", "checksum"];

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || !COMMANDS.contains(&args[1].as_str()) {
        eprintln!("Usage: {} <{}> <glob>...", args[0], COMMANDS.join("|"));
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} validate 'games/*.pgn'", args[0]);
        std::process::exit(1);
    }

    let command = args[1].as_str();
    let config = ToolConfig::from_env();
    let files = find_files(&args[2..])?;
    if files.is_empty() {
        bail!("No PGN files matched {:?}", &args[2..]);
    }
    info!("Found {} PGN files", files.len());

    let start = Instant::now();
    let mut total = 0usize;
    let mut failed = 0usize;

    for path in &files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let games = split_games(&text);
        info!("Processing {} ({} games)", path.display(), games.len());

        for (index, game) in games.iter().enumerate() {
            total += 1;
            if !run(command, game, &config) {
                failed += 1;
                warn!(file = %path.display(), game = index, "Game failed");
            }
        }
    }

    info!(
        "Done: {} games, {} failed in {:.1}s",
        total,
        failed,
        start.elapsed().as_secs_f64()
    );
    if failed > 0 && command == "validate" {
        std::process::exit(2);
    }
    Ok(())
}

fn find_files(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).with_context(|| format!("bad pattern {}", pattern))?;
        files.extend(matches.filter_map(|p| p.ok()));
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Run one command on one game. Returns false when the game failed.
fn run(command: &str, game: &str, config: &ToolConfig) -> bool {
    match command {
        "validate" => {
            let report = validate(game);
            for error in &report.errors {
                println!("{}", error);
            }
            report.valid
        }
        "strip" => {
            println!("{}\n", strip_annotations(game));
            true
        }
        "optimize" => {
            println!("{}\n", optimize(game));
            true
        }
        "checksum" => {
            println!("{:08x}", checksum(game));
            true
        }
        "export" | "json" => match parse_game_with::<ShakmatyEngine>(game, &config.parse) {
            Ok(tree) if command == "export" => {
                println!("{}", export_game(&tree, &config.export));
                true
            }
            Ok(tree) => match serde_json::to_string(&tree) {
                Ok(json) => {
                    println!("{}", json);
                    true
                }
                Err(e) => {
                    warn!("Serialization failed: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("Parse failed: {}", e);
                false
            }
        },
        _ => false,
    }
}
