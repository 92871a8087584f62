//! # Lootrun Inspector
//!
//! Command-line tool that compiles every saved lootrun in a directory and
//! prints its statistics.

use lootrun_compiler::LootrunCompiler;
use lootrun_session::{JsonDirectoryStore, LootrunCache, LootrunConfig};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         LOOTRUN INSPECTOR                                        ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: lootrun_inspect <lootrun_dir>");
        println!();
        println!("Options:");
        println!("  --config <file>  Compile with settings from a TOML config");
        println!("  --verbose        List every chunk of every lootrun");
        return;
    }

    let dir = &args[1];
    let verbose = args.iter().any(|a| a == "--verbose");
    let config = match args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
    {
        Some(path) => match LootrunConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: Could not load config: {e}");
                return;
            }
        },
        None => LootrunConfig::default(),
    };

    println!("Scanning: {dir}");

    let store = JsonDirectoryStore::new(dir);
    let compiler = LootrunCompiler::new(config.compile_settings());
    let mut cache = LootrunCache::new();
    let report = match cache.refresh(&store, &compiler) {
        Ok(report) => report,
        Err(e) => {
            println!("Error: Could not list lootruns: {e}");
            return;
        }
    };

    println!();
    for instance in cache.instances() {
        let stats = instance.stats();
        println!("┌─ {} ", instance.name());
        println!("│ Chunks:             {}", stats.chunks);
        println!("│ Segments:           {}", stats.segments);
        println!("│ Points:             {}", stats.points);
        println!("│ Chests:             {}", stats.chests);
        println!("│ Notes:              {}", stats.notes);
        if verbose {
            for (key, segments) in instance.segments() {
                println!(
                    "│   chunk ({:>5}, {:>5}): {} segments",
                    key.chunk_x(),
                    key.chunk_z(),
                    segments.len()
                );
            }
        }
        println!("└──────────────────────────────────────────────────────────────────┘");
    }

    println!();
    if report.failed.is_empty() {
        println!("✓ {} lootruns compiled", report.loaded);
    } else {
        println!(
            "⚠ {} lootruns compiled, {} unreadable:",
            report.loaded,
            report.failed.len()
        );
        for file in &report.failed {
            println!("  - {file}");
        }
    }
}
