use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{EncounterId, TokenId};

/// One attack attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub encounter_id: EncounterId,
    pub attacker_id: TokenId,
    pub attacker_name: String,
    pub victim_id: TokenId,
    pub victim_name: String,
    pub hit: bool,
    pub damage: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombatantStats {
    pub name: String,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub hits: u32,
    pub attacks: u32,
    pub times_targeted: u32,
}

impl CombatantStats {
    /// Average damage per successful hit (DPR).
    pub fn dpr(&self) -> f64 {
        if self.hits == 0 {
            0.0
        } else {
            self.damage_dealt as f64 / self.hits as f64
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.attacks == 0 {
            0.0
        } else {
            self.hits as f64 / self.attacks as f64
        }
    }

    /// Average damage over every attack attempt made.
    pub fn avg_damage_dealt(&self) -> f64 {
        if self.attacks == 0 {
            0.0
        } else {
            self.damage_dealt as f64 / self.attacks as f64
        }
    }

    /// Average damage over every attack attempt received.
    pub fn avg_damage_taken(&self) -> f64 {
        if self.times_targeted == 0 {
            0.0
        } else {
            self.damage_taken as f64 / self.times_targeted as f64
        }
    }

    /// `Dealt: 12 (4.00), Taken: 3 (1.50), Hit Ratio: 2/3 (66.7%)`
    pub fn summary_line(&self) -> String {
        format!(
            "Dealt: {} ({:.2}), Taken: {} ({:.2}), Hit Ratio: {}/{} ({:.1}%)",
            self.damage_dealt,
            self.avg_damage_dealt(),
            self.damage_taken,
            self.avg_damage_taken(),
            self.hits,
            self.attacks,
            100.0 * self.hit_ratio()
        )
    }
}

/// Append-only attack log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatLog {
    records: Vec<AttackRecord>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AttackRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, other: CombatLog) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[AttackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_encounter(&self, id: EncounterId) -> impl Iterator<Item = &AttackRecord> {
        self.records.iter().filter(move |r| r.encounter_id == id)
    }

    /// Per-combatant totals, in order of first appearance.
    pub fn summarize(&self) -> IndexMap<TokenId, CombatantStats> {
        let mut out: IndexMap<TokenId, CombatantStats> = IndexMap::new();
        for r in &self.records {
            let attacker = out.entry(r.attacker_id).or_insert_with(|| CombatantStats {
                name: r.attacker_name.clone(),
                ..Default::default()
            });
            attacker.attacks += 1;
            attacker.damage_dealt += r.damage as i64;
            if r.hit {
                attacker.hits += 1;
            }
            let victim = out.entry(r.victim_id).or_insert_with(|| CombatantStats {
                name: r.victim_name.clone(),
                ..Default::default()
            });
            victim.times_targeted += 1;
            victim.damage_taken += r.damage as i64;
        }
        out
    }

    /// One JSON object per line, one line per attack attempt.
    pub fn write_json_lines<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for r in &self.records {
            serde_json::to_writer(&mut out, r)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
