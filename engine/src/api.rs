use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use encoding_rs::Encoding;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::content::{builtin_catalog, builtin_maps, builtin_scenarios};
use crate::encounter::{deploy, Encounter, EncounterError};
use crate::grid::Grid;
use crate::ids::{IdAllocator, TokenId};
use crate::scenario::{Catalog, Scenario};
use crate::stats::{CombatLog, CombatantStats};
use crate::team::Team;
use crate::Dice;

const DEFAULT_ENCOUNTERS: u32 = 1000;
const DEFAULT_MAX_ROUNDS: u32 = 500;
const DEFAULT_GRID_SHAPE: (usize, usize) = (10, 10);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Scenario file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[serde(default)]
    pub scenario_path: Option<String>,
    /// Builtin scenario, used when no path is given.
    #[serde(default)]
    pub scenario_id: Option<String>,
    /// Directory of character sheet JSON files, added to the builtins.
    #[serde(default)]
    pub characters_dir: Option<String>,
    /// Monster catalog, one JSON stat block per line, added to the builtins.
    #[serde(default)]
    pub monsters_path: Option<String>,
    #[serde(default)]
    pub map_path: Option<String>,
    #[serde(default)]
    pub map_id: Option<String>,
    /// `(height, width)` of the empty grid used when no map is given.
    #[serde(default = "default_grid_shape")]
    pub grid_shape: (usize, usize),
    #[serde(default = "default_encounters")]
    pub encounters: u32,
    #[serde(default)]
    pub seed: u64,
    /// Rounds before a battle is called a stalemate; `None` plays on forever.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: Option<u32>,
}

fn default_grid_shape() -> (usize, usize) {
    DEFAULT_GRID_SHAPE
}

fn default_encounters() -> u32 {
    DEFAULT_ENCOUNTERS
}

fn default_max_rounds() -> Option<u32> {
    Some(DEFAULT_MAX_ROUNDS)
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario_path: None,
            scenario_id: None,
            characters_dir: None,
            monsters_path: None,
            map_path: None,
            map_id: None,
            grid_shape: DEFAULT_GRID_SHAPE,
            encounters: DEFAULT_ENCOUNTERS,
            seed: 0,
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchSummary {
    pub encounters: u32,
    /// Wins per team name, in scenario order.
    pub wins: IndexMap<String, u32>,
    pub stalemates: u32,
    /// Battles decided without a fight because deployment left fewer than
    /// two teams on the grid. Also counted in `wins` or `stalemates`.
    pub walkovers: u32,
    pub total_rounds: u64,
    /// Members dropped because the grid had no room for them.
    pub dropped: usize,
    /// Per-combatant lines of the last battle.
    pub last_summary: Vec<String>,
    /// Grid snapshot at the end of the last battle.
    pub final_grid: String,
    #[serde(skip)]
    pub log: CombatLog,
}

impl BatchSummary {
    pub fn win_rate(&self, team: &str) -> f64 {
        if self.encounters == 0 {
            return 0.0;
        }
        self.wins.get(team).copied().unwrap_or(0) as f64 / self.encounters as f64
    }

    pub fn avg_rounds(&self) -> f64 {
        if self.encounters == 0 {
            0.0
        } else {
            self.total_rounds as f64 / self.encounters as f64
        }
    }

    /// Totals per combatant across every battle of the batch.
    pub fn combatant_stats(&self) -> IndexMap<TokenId, CombatantStats> {
        self.log.summarize()
    }
}

/// Knobs of [`run_batch`] that are independent of content loading.
#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    pub encounters: u32,
    pub max_rounds: Option<u32>,
}

/// Run `settings.encounters` battles between `teams` on `grid`, reusing the
/// same characters and map. Characters are reset and redeployed before each
/// battle; walls and start zones stay.
pub fn run_batch(
    teams: &mut Vec<Team>,
    grid: &mut Grid,
    ids: &mut IdAllocator,
    dice: &mut Dice,
    settings: BatchSettings,
) -> Result<BatchSummary, EncounterError> {
    let mut wins: IndexMap<String, u32> = teams.iter().map(|t| (t.name().to_string(), 0)).collect();
    let mut stalemates = 0;
    let mut walkovers = 0;
    let mut total_rounds = 0u64;
    let mut dropped = 0;
    let mut last_summary = Vec::new();
    let mut log = CombatLog::new();

    for _ in 0..settings.encounters {
        grid.clear_characters()?;
        for team in teams.iter_mut() {
            for member in team.members_mut() {
                member.reset()?;
            }
        }
        dropped += deploy(teams, grid, dice)?;

        let fielded: Vec<&Team> = teams.iter().filter(|t| !t.is_empty()).collect();
        if fielded.len() < 2 {
            warn!(fielded = fielded.len(), "too few teams on the grid, no battle fought");
            match fielded.first() {
                Some(team) => *wins.entry(team.name().to_string()).or_insert(0) += 1,
                None => stalemates += 1,
            }
            walkovers += 1;
            last_summary.clear();
            continue;
        }

        let mut encounter = Encounter::new(ids.next_encounter(), teams, grid)?;
        if let Some(limit) = settings.max_rounds {
            encounter = encounter.with_round_limit(limit);
        }
        encounter.init_combat(dice)?;
        let conclusion = encounter.run(dice)?;

        total_rounds += conclusion.rounds as u64;
        match encounter.winner() {
            Some(team) => *wins.entry(team.name().to_string()).or_insert(0) += 1,
            None => stalemates += 1,
        }
        last_summary = encounter.summary();
        log.extend(encounter.into_log());
    }

    info!(encounters = settings.encounters, ?wins, stalemates, walkovers, "batch finished");
    Ok(BatchSummary {
        encounters: settings.encounters,
        wins,
        stalemates,
        walkovers,
        total_rounds,
        dropped,
        last_summary,
        final_grid: grid.to_string(),
        log,
    })
}

/// Load content named by `cfg` and run the batch.
pub fn simulate_batch(cfg: BatchConfig) -> Result<BatchSummary> {
    let mut ids = IdAllocator::new();
    let catalog = load_catalog(&cfg)?;
    let scenario = load_scenario(&cfg)?;
    let mut grid = load_grid(&cfg, &mut ids)?;
    let mut teams = scenario
        .build_teams(&catalog, &mut ids)
        .context("failed to build teams from scenario")?;
    let mut dice = Dice::from_seed(cfg.seed);
    let settings = BatchSettings {
        encounters: cfg.encounters,
        max_rounds: cfg.max_rounds,
    };
    let summary = run_batch(&mut teams, &mut grid, &mut ids, &mut dice, settings)?;
    Ok(summary)
}

/// Read a text file, honoring a byte-order mark when present.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (text, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(text.into_owned())
    } else {
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
    }
}

fn load_catalog(cfg: &BatchConfig) -> Result<Catalog> {
    let mut catalog = builtin_catalog().context("failed to load builtin content")?;
    if let Some(dir) = &cfg.characters_dir {
        let entries = fs::read_dir(dir).with_context(|| format!("failed to list character sheets in {}", dir))?;
        for entry in entries {
            let path = entry?.path();
            let is_sheet = path.extension().is_some_and(|e| e == "json")
                && path.file_stem().is_some_and(|s| s != "template");
            if !is_sheet {
                continue;
            }
            let text = read_text(&path)?;
            catalog
                .add_character_json(&text)
                .with_context(|| format!("failed to parse character sheet: {}", path.display()))?;
        }
    }
    if let Some(path) = &cfg.monsters_path {
        let text = read_text(Path::new(path))?;
        catalog
            .add_monsters_jsonl(&text)
            .with_context(|| format!("failed to parse monster catalog: {}", path))?;
    }
    Ok(catalog)
}

fn load_scenario(cfg: &BatchConfig) -> Result<Scenario> {
    if let Some(path) = &cfg.scenario_path {
        let text = read_text(Path::new(path))?;
        let is_yaml = path.ends_with(".yaml") || path.ends_with(".yml");
        let scenario = if is_yaml {
            Scenario::from_yaml(&text)
        } else {
            Scenario::from_json(&text)
        };
        return scenario.with_context(|| format!("failed to parse scenario: {}", path));
    }
    let Some(id) = &cfg.scenario_id else {
        bail!("no scenario given (set a scenario path or a builtin scenario id)");
    };
    let text = builtin_scenarios()
        .get(id.as_str())
        .copied()
        .ok_or_else(|| anyhow!("builtin scenario '{}' not found", id))?;
    // builtins mix JSON and YAML; YAML parses both
    Scenario::from_yaml(text).with_context(|| format!("failed to parse builtin scenario '{}'", id))
}

fn load_grid(cfg: &BatchConfig, ids: &mut IdAllocator) -> Result<Grid> {
    let text = match (&cfg.map_path, &cfg.map_id) {
        (Some(path), _) => read_text(Path::new(path))?,
        (None, Some(id)) => builtin_maps()
            .get(id.as_str())
            .map(|m| m.to_string())
            .ok_or_else(|| anyhow!("builtin map '{}' not found", id))?,
        (None, None) => {
            let (height, width) = cfg.grid_shape;
            return Ok(Grid::new(height, width));
        }
    };
    Grid::from_map_str(ids, &text).context("failed to build grid from map")
}
