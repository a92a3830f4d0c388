use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterSheet, EntityError};
use crate::ids::IdAllocator;
use crate::team::Team;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("malformed member reference '{0}' (expected <source>.<name>)")]
    MalformedRef(String),
    #[error("unsupported character source '{0}'")]
    UnknownSource(String),
    #[error("no {kind} named '{name}' in the catalog")]
    UnknownCharacter { kind: &'static str, name: String },
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error("invalid sheet JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A team member entry: `"monster.orc"` or `{ "ref": "monster.orc", "count": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberSpec {
    One(String),
    Counted {
        #[serde(rename = "ref")]
        reference: String,
        count: u32,
    },
}

impl MemberSpec {
    pub fn reference(&self) -> &str {
        match self {
            MemberSpec::One(r) => r,
            MemberSpec::Counted { reference, .. } => reference,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            MemberSpec::One(_) => 1,
            MemberSpec::Counted { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub team1: TeamSpec,
    pub team2: TeamSpec,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn teams(&self) -> [&TeamSpec; 2] {
        [&self.team1, &self.team2]
    }

    /// Instantiate both teams; every copy of a sheet gets its own id.
    pub fn build_teams(&self, catalog: &Catalog, ids: &mut IdAllocator) -> Result<Vec<Team>, ScenarioError> {
        self.teams()
            .into_iter()
            .map(|team| -> Result<Team, ScenarioError> {
                let mut members = Vec::new();
                for entry in &team.members {
                    let sheet = catalog.resolve(entry.reference())?;
                    for _ in 0..entry.count() {
                        members.push(Character::from_sheet(ids, sheet.clone())?);
                    }
                }
                Ok(Team::new(team.name.clone(), members)?)
            })
            .collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Character,
    Monster,
}

impl Source {
    fn label(self) -> &'static str {
        match self {
            Source::Character => "character",
            Source::Monster => "monster",
        }
    }
}

/// Split `"character.jake"` into its source and lowercased name.
pub fn parse_reference(reference: &str) -> Result<(Source, String), ScenarioError> {
    let (source, name) = reference
        .trim()
        .split_once('.')
        .ok_or_else(|| ScenarioError::MalformedRef(reference.to_string()))?;
    let source = match source.to_lowercase().as_str() {
        "character" => Source::Character,
        "monster" => Source::Monster,
        _ => return Err(ScenarioError::UnknownSource(source.to_string())),
    };
    Ok((source, name.trim().to_lowercase()))
}

/// Character sheets and monster stat blocks keyed by lowercased name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    characters: HashMap<String, CharacterSheet>,
    monsters: HashMap<String, CharacterSheet>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source, sheet: CharacterSheet) {
        let key = sheet.name.to_lowercase();
        match source {
            Source::Character => self.characters.insert(key, sheet),
            Source::Monster => self.monsters.insert(key, sheet),
        };
    }

    /// One character sheet as a JSON document.
    pub fn add_character_json(&mut self, text: &str) -> Result<(), ScenarioError> {
        let sheet: CharacterSheet = serde_json::from_str(text)?;
        self.insert(Source::Character, sheet);
        Ok(())
    }

    /// A monster catalog with one JSON stat block per line.
    pub fn add_monsters_jsonl(&mut self, text: &str) -> Result<usize, ScenarioError> {
        let mut added = 0;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let sheet: CharacterSheet = serde_json::from_str(line)?;
            self.insert(Source::Monster, sheet);
            added += 1;
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.characters.len() + self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolve(&self, reference: &str) -> Result<&CharacterSheet, ScenarioError> {
        let (source, name) = parse_reference(reference)?;
        let table = match source {
            Source::Character => &self.characters,
            Source::Monster => &self.monsters,
        };
        table.get(&name).ok_or(ScenarioError::UnknownCharacter {
            kind: source.label(),
            name,
        })
    }
}
