use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dice::{AdMode, DamageDice, Dice, DiceError};
use crate::ids::{IdAllocator, TokenId};
use crate::token::Token;
use crate::{ability_mod, check, CheckInput, CheckResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("team name cannot be empty")]
    EmptyTeamName,
    #[error("character '{0}' has no attacks")]
    NoAttacks(String),
    #[error("character '{character}' lists attack '{attack}' twice")]
    DuplicateAttack { character: String, attack: String },
    #[error("unknown attack '{attack}' for character '{character}'")]
    UnknownAttack { character: String, attack: String },
    #[error("invalid range '{0}' (expected <low>/<high>)")]
    InvalidRange(String),
    #[error("attack '{0}' has no damage dice")]
    NoDamageDice(String),
    #[error(transparent)]
    Dice(#[from] DiceError),
    #[error("character '{0}' must start with at least 1 HP")]
    InvalidStartingHp(String),
    #[error("HP {value} is outside 0..={max}")]
    HpOutOfRange { value: i32, max: i32 },
    #[error("speed {value} is outside 0..={max}")]
    SpeedOutOfRange { value: u32, max: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub str_: i32,
    pub dex: i32,
    pub con: i32,
    pub int_: i32,
    pub wis: i32,
    pub cha: i32,
}

impl AbilityScores {
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str_,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int_,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        ability_mod(self.score(ability))
    }
}

/// Attack as it appears in a character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackSheet {
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub range: String,
    pub atk_bonus: i32,
    pub dmg_rolls: Vec<String>,
    #[serde(default)]
    pub dmg_bonus: i32,
    pub dmg_type: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Character or monster record produced by the content loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub icon: char,
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    pub ac: i32,
    pub hp: i32,
    /// Feet per turn, a multiple of 5.
    pub speed: u32,
    #[serde(default = "one")]
    pub num_attacks: u32,
    pub attacks: Vec<AttackSheet>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attack {
    pub name: String,
    /// Informational only (melee, ranged, thrown...).
    pub category: String,
    /// `(min, max)` reach in feet.
    pub reach: (u32, u32),
    pub attack_bonus: i32,
    pub damage: Vec<DamageDice>,
    pub damage_bonus: i32,
    pub damage_type: String,
    pub properties: BTreeSet<String>,
}

impl Attack {
    pub fn from_sheet(sheet: &AttackSheet) -> Result<Self, EntityError> {
        let damage = sheet
            .dmg_rolls
            .iter()
            .map(|d| d.parse::<DamageDice>())
            .collect::<Result<Vec<_>, _>>()?;
        if damage.is_empty() {
            return Err(EntityError::NoDamageDice(sheet.name.clone()));
        }
        Ok(Self {
            name: sheet.name.clone(),
            category: sheet.category.clone(),
            reach: parse_range(&sheet.range)?,
            attack_bonus: sheet.atk_bonus,
            damage,
            damage_bonus: sheet.dmg_bonus,
            damage_type: sheet.dmg_type.clone(),
            properties: sheet.properties.iter().cloned().collect(),
        })
    }
}

fn parse_range(range: &str) -> Result<(u32, u32), EntityError> {
    let invalid = || EntityError::InvalidRange(range.to_string());
    let (low, high) = range.split_once('/').ok_or_else(invalid)?;
    let low = low.trim().parse().map_err(|_| invalid())?;
    let high = high.trim().parse().map_err(|_| invalid())?;
    Ok((low, high))
}

/// Which attack a caller wants from a character.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttackRef {
    /// The main-hand attack.
    #[default]
    Default,
    ByName(String),
    Direct(Attack),
}

/// Everything derived from a sheet; rebuilt wholesale on reset.
#[derive(Debug, Clone)]
struct Parsed {
    abilities: AbilityScores,
    ac: i32,
    hp: i32,
    hp_max: i32,
    speed: u32,
    speed_max: u32,
    attacks: IndexMap<String, Attack>,
    num_attacks: u32,
}

impl Parsed {
    fn from_sheet(sheet: &CharacterSheet) -> Result<Self, EntityError> {
        if sheet.hp < 1 {
            return Err(EntityError::InvalidStartingHp(sheet.name.clone()));
        }
        if sheet.attacks.is_empty() {
            return Err(EntityError::NoAttacks(sheet.name.clone()));
        }
        let mut attacks = IndexMap::with_capacity(sheet.attacks.len());
        for atk in &sheet.attacks {
            let attack = Attack::from_sheet(atk)?;
            if attacks.contains_key(&attack.name) {
                return Err(EntityError::DuplicateAttack {
                    character: sheet.name.clone(),
                    attack: attack.name,
                });
            }
            attacks.insert(attack.name.clone(), attack);
        }
        let speed = (sheet.speed / 5).max(1);
        Ok(Self {
            abilities: AbilityScores {
                str_: sheet.strength,
                dex: sheet.dexterity,
                con: sheet.constitution,
                int_: sheet.intelligence,
                wis: sheet.wisdom,
                cha: sheet.charisma,
            },
            ac: sheet.ac,
            hp: sheet.hp,
            hp_max: sheet.hp,
            speed,
            speed_max: speed,
            attacks,
            num_attacks: sheet.num_attacks,
        })
    }
}

/// A (non) player character placed on a grid as a token.
#[derive(Debug, Clone)]
pub struct Character {
    token: Token,
    sheet: CharacterSheet,
    state: Parsed,
    /// The enemy currently being pursued.
    pub goal: Option<TokenId>,
}

impl Character {
    pub fn from_sheet(ids: &mut IdAllocator, sheet: CharacterSheet) -> Result<Self, EntityError> {
        let state = Parsed::from_sheet(&sheet)?;
        Ok(Self {
            token: Token::new(ids, sheet.name.clone(), sheet.icon),
            sheet,
            state,
            goal: None,
        })
    }

    pub fn id(&self) -> TokenId {
        self.token.id
    }

    pub fn name(&self) -> &str {
        &self.token.name
    }

    pub fn icon(&self) -> char {
        self.token.icon
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn sheet(&self) -> &CharacterSheet {
        &self.sheet
    }

    pub fn abilities(&self) -> &AbilityScores {
        &self.state.abilities
    }

    pub fn ability_mod(&self, ability: Ability) -> i32 {
        self.state.abilities.mod_of(ability)
    }

    pub fn ability_modifiers(&self) -> [(Ability, i32); 6] {
        Ability::ALL.map(|a| (a, self.ability_mod(a)))
    }

    pub fn armor_class(&self) -> i32 {
        self.state.ac
    }

    pub fn hp(&self) -> i32 {
        self.state.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.state.hp_max
    }

    pub fn set_hp(&mut self, value: i32) -> Result<(), EntityError> {
        if !(0..=self.state.hp_max).contains(&value) {
            return Err(EntityError::HpOutOfRange {
                value,
                max: self.state.hp_max,
            });
        }
        self.state.hp = value;
        Ok(())
    }

    /// Subtract `amount` (negative amounts are ignored), stopping at 0 HP.
    /// Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.state.hp;
        self.state.hp = (before - amount.max(0)).max(0);
        before - self.state.hp
    }

    pub fn is_alive(&self) -> bool {
        self.state.hp > 0
    }

    /// Grid cells per turn.
    pub fn speed(&self) -> u32 {
        self.state.speed
    }

    pub fn max_speed(&self) -> u32 {
        self.state.speed_max
    }

    pub fn set_speed(&mut self, value: u32) -> Result<(), EntityError> {
        if value > self.state.speed_max {
            return Err(EntityError::SpeedOutOfRange {
                value,
                max: self.state.speed_max,
            });
        }
        self.state.speed = value;
        Ok(())
    }

    pub fn attacks(&self) -> impl Iterator<Item = &Attack> {
        self.state.attacks.values()
    }

    pub fn num_attacks(&self) -> u32 {
        self.state.num_attacks
    }

    pub fn main_attack(&self) -> &Attack {
        // Parsed::from_sheet rejects sheets without attacks.
        &self.state.attacks[0]
    }

    /// Resolve `which` against this character's attacks. Only `Direct`
    /// borrows from `which`; use [`Character::attack_named`] to hold a
    /// looked-up attack past the reference.
    pub fn attack<'a>(&'a self, which: &'a AttackRef) -> Result<&'a Attack, EntityError> {
        match which {
            AttackRef::Default => Ok(self.main_attack()),
            AttackRef::Direct(attack) => Ok(attack),
            AttackRef::ByName(name) => self.attack_named(name),
        }
    }

    pub fn attack_named(&self, name: &str) -> Result<&Attack, EntityError> {
        self.state.attacks.get(name).ok_or_else(|| EntityError::UnknownAttack {
            character: self.name().to_string(),
            attack: name.to_string(),
        })
    }

    /// Pick the attack to use against `_target`. Always the main hand for now.
    pub fn choose_attack(&self, _target: &Character) -> AttackRef {
        AttackRef::Default
    }

    /// d20 + DEX modifier.
    pub fn roll_initiative(&self, dice: &mut Dice) -> i32 {
        dice.d20(AdMode::Normal) as i32 + self.ability_mod(Ability::Dex)
    }

    pub fn saving_throw(&self, dice: &mut Dice, ability: Ability, mode: AdMode, dc: i32) -> CheckResult {
        check(
            dice,
            CheckInput {
                dc,
                modifier: self.ability_mod(ability),
                mode,
            },
        )
    }

    /// Rebuild every sheet-derived field (HP, speed, scores, attacks) and
    /// forget the current goal. The id is kept.
    pub fn reset(&mut self) -> Result<(), EntityError> {
        self.state = Parsed::from_sheet(&self.sheet)?;
        self.goal = None;
        Ok(())
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.label())
    }
}
