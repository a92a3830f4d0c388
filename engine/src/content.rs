use std::collections::HashMap;

use crate::scenario::{Catalog, ScenarioError};

pub fn builtin_characters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("jake", include_str!("../content/characters/jake.json")),
        ("mortimer", include_str!("../content/characters/mortimer.json")),
    ])
}

pub fn builtin_monsters() -> &'static str {
    include_str!("../content/monsters.jsonl")
}

pub fn builtin_scenarios() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "orcs_vs_commoners",
            include_str!("../content/scenarios/orcs_vs_commoners.json"),
        ),
        (
            "heroes_vs_zombies",
            include_str!("../content/scenarios/heroes_vs_zombies.yaml"),
        ),
    ])
}

pub fn builtin_maps() -> HashMap<&'static str, &'static str> {
    HashMap::from([("arena", include_str!("../content/maps/arena.txt"))])
}

/// Every builtin character sheet and monster.
pub fn builtin_catalog() -> Result<Catalog, ScenarioError> {
    let mut catalog = Catalog::new();
    for text in builtin_characters().values() {
        catalog.add_character_json(text)?;
    }
    catalog.add_monsters_jsonl(builtin_monsters())?;
    Ok(catalog)
}
