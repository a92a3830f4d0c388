use tracing::debug;

use crate::character::{Attack, Character, EntityError};
use crate::dice::{AdMode, Dice};

use super::{attack, damage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub attack: String,
    pub hit: bool,
    pub critical: bool,
    pub damage: i32,
}

/// Resolve one attack of `attacker` against `victim` using the attack the
/// attacker picks for that target.
pub fn resolve(attacker: &Character, victim: &mut Character, dice: &mut Dice) -> Result<Resolution, EntityError> {
    let choice = attacker.choose_attack(victim);
    let chosen = attacker.attack(&choice)?;
    Ok(resolve_with(attacker.name(), chosen, victim, dice))
}

/// Resolve `chosen` against `victim` and apply the damage. HP stops at 0.
pub fn resolve_with(attacker_name: &str, chosen: &Attack, victim: &mut Character, dice: &mut Dice) -> Resolution {
    let atk = attack(dice, AdMode::Normal, chosen.attack_bonus, victim.armor_class());
    let dealt = if atk.hit {
        let dmg = damage(dice, &chosen.damage, chosen.damage_bonus, atk.is_crit);
        victim.take_damage(dmg);
        dmg
    } else {
        0
    };
    debug!(
        attacker = attacker_name,
        victim = %victim,
        attack = %chosen.name,
        roll = atk.roll,
        total = atk.total,
        ac = atk.ac,
        hit = atk.hit,
        crit = atk.is_crit,
        damage = dealt,
        victim_hp = victim.hp(),
        "attack resolved"
    );
    Resolution {
        attack: chosen.name.clone(),
        hit: atk.hit,
        critical: atk.is_crit,
        damage: dealt,
    }
}
