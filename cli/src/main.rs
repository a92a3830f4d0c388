use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tactics_engine::api::{simulate_batch, BatchConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tactics")]
#[command(about = "Batch-simulate grid battles between two teams")]
struct Cli {
    /// Scenario file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long, conflicts_with = "scenario_id")]
    scenario: Option<PathBuf>,

    /// Builtin scenario id
    #[arg(long, default_value = "orcs_vs_commoners")]
    scenario_id: String,

    /// Directory of character sheet JSON files
    #[arg(long)]
    characters: Option<PathBuf>,

    /// Monster catalog (one JSON stat block per line)
    #[arg(long)]
    monsters: Option<PathBuf>,

    /// Map file; digits mark team start zones, '#' marks walls
    #[arg(long, conflicts_with = "map_id")]
    map: Option<PathBuf>,

    /// Builtin map id
    #[arg(long)]
    map_id: Option<String>,

    /// Number of battles to play
    #[arg(long, default_value_t = 1000)]
    encounters: u32,

    /// RNG seed for determinism
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Rounds before a battle is called a stalemate (0 = no limit)
    #[arg(long, default_value_t = 500)]
    max_rounds: u32,

    /// Write every attack as one JSON line to this file
    #[arg(long)]
    log_out: Option<PathBuf>,

    /// Print the grid as it stood at the end of the last battle
    #[arg(long, default_value_t = false)]
    show_grid: bool,
}

fn path_string(p: Option<PathBuf>) -> Option<String> {
    p.map(|p| p.to_string_lossy().into_owned())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = BatchConfig {
        scenario_id: cli.scenario.is_none().then(|| cli.scenario_id.clone()),
        scenario_path: path_string(cli.scenario),
        characters_dir: path_string(cli.characters),
        monsters_path: path_string(cli.monsters),
        map_path: path_string(cli.map),
        map_id: cli.map_id,
        encounters: cli.encounters,
        seed: cli.seed,
        max_rounds: (cli.max_rounds > 0).then_some(cli.max_rounds),
        ..BatchConfig::default()
    };

    let summary = simulate_batch(cfg)?;

    println!("tactics results");
    println!("---------------");
    println!("encounters:         {}", summary.encounters);
    for (team, wins) in &summary.wins {
        println!(
            "{:<20}{} ({:.1}%)",
            format!("{}:", team),
            wins,
            summary.win_rate(team) * 100.0
        );
    }
    println!("stalemates:         {}", summary.stalemates);
    println!("avg rounds:         {:.2}", summary.avg_rounds());
    if summary.walkovers > 0 {
        println!("walkovers:          {}", summary.walkovers);
    }
    if summary.dropped > 0 {
        println!("dropped (no room):  {}", summary.dropped);
    }
    println!();
    println!("totals per combatant");
    for (id, stats) in summary.combatant_stats() {
        println!(
            "{}_{}: {} (DPR {:.2})",
            stats.name,
            id,
            stats.summary_line(),
            stats.dpr()
        );
    }
    println!();
    println!("last encounter");
    for line in &summary.last_summary {
        println!("{}", line);
    }

    if cli.show_grid {
        println!();
        println!("{}", summary.final_grid);
    }

    if let Some(path) = cli.log_out {
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        summary.log.write_json_lines(&mut out)?;
        out.flush()?;
    }

    Ok(())
}
