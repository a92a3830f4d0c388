pub mod api;
pub mod character;
pub mod combat;
pub mod content;
pub mod dice;
pub mod encounter;
pub mod grid;
pub mod ids;
pub mod path;
pub mod scenario;
pub mod stats;
pub mod team;
pub mod token;

pub use character::{Ability, AbilityScores, Attack, AttackRef, Character, CharacterSheet, EntityError};
pub use dice::{parse_die, AdMode, DamageDice, Dice, DiceError};
pub use encounter::{deploy, Conclusion, Encounter, EncounterError, EncounterState, RoundOutcome};
pub use grid::{Adjacency, Grid, GridError, Pos};
pub use ids::{EncounterId, IdAllocator, TokenId};
pub use path::{find_path, step_toward};
pub use stats::{AttackRecord, CombatLog, CombatantStats};
pub use team::Team;
pub use token::Token;

#[derive(Debug, Clone, Copy)]
pub struct CheckInput {
    pub dc: i32,
    pub modifier: i32,
    pub mode: AdMode,
}

#[derive(Debug, Clone, Copy)]
pub struct CheckResult {
    pub roll: i32,
    pub total: i32,
    pub dc: i32,
    pub passed: bool,
}

/// Roll a d20 (with advantage/disadvantage), add modifier, compare vs DC.
pub fn check(dice: &mut Dice, input: CheckInput) -> CheckResult {
    let roll = dice.d20(input.mode) as i32;
    let total = roll + input.modifier;
    CheckResult { roll, total, dc: input.dc, passed: total >= input.dc }
}

/// Ability modifier = floor((score - 10) / 2).
pub fn ability_mod(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    (score - 10).div_euclid(2)
}
