pub mod resolve;

use crate::dice::{AdMode, DamageDice, Dice};

pub use resolve::{resolve, resolve_with, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    /// The kept d20 face.
    pub roll: i32,
    pub total: i32,
    pub ac: i32,
    pub hit: bool,
    pub is_crit: bool,
}

/// d20 + `bonus` against `ac`. A natural 20 always hits and is a critical.
pub fn attack(dice: &mut Dice, mode: AdMode, bonus: i32, ac: i32) -> AttackResult {
    let roll = dice.d20(mode) as i32;
    let total = roll + bonus;
    let is_crit = roll == 20;
    AttackResult {
        roll,
        total,
        ac,
        hit: is_crit || total >= ac,
        is_crit,
    }
}

/// Roll every damage term (dice count doubled on a crit) and add `bonus` once.
pub fn damage(dice: &mut Dice, terms: &[DamageDice], bonus: i32, crit: bool) -> i32 {
    let factor = if crit { 2 } else { 1 };
    let rolled = terms
        .iter()
        .map(|t| dice.roll(t.sides, t.count.saturating_mul(factor), AdMode::Normal))
        .fold(0u32, u32::saturating_add);
    i32::try_from(rolled).unwrap_or(i32::MAX).saturating_add(bonus).max(0)
}
