use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("invalid die expression '{0}' (expected <count>d<sides>)")]
    MissingSeparator(String),
    #[error("invalid die expression '{expr}': '{part}' is not a number")]
    NotANumber { expr: String, part: String },
    #[error("invalid die expression '{0}': a die needs at least one side")]
    ZeroSides(String),
}

/// Parse `"<count>d<sides>"` (case-insensitive, surrounding whitespace ignored)
/// into `(sides, count)`.
pub fn parse_die(expr: &str) -> Result<(u32, u32), DiceError> {
    let lowered = expr.trim().to_lowercase();
    let (count, sides) = lowered
        .split_once('d')
        .ok_or_else(|| DiceError::MissingSeparator(expr.to_string()))?;
    let number = |part: &str| {
        part.trim().parse::<u32>().map_err(|_| DiceError::NotANumber {
            expr: expr.to_string(),
            part: part.to_string(),
        })
    };
    let count = number(count)?;
    let sides = number(sides)?;
    if sides == 0 {
        return Err(DiceError::ZeroSides(expr.to_string()));
    }
    Ok((sides, count))
}

/// One damage term of an attack, e.g. `2d6`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub count: u32,
    pub sides: u32,
}

impl DamageDice {
    pub fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }
}

impl FromStr for DamageDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sides, count) = parse_die(s)?;
        Ok(Self { count, sides })
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// Seedable dice stream. Every random decision of a simulation (rolls and
/// random placement) is drawn from here so a seed reproduces a battle.
pub struct Dice {
    rng: ChaCha8Rng,
    script: VecDeque<u32>,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            script: VecDeque::new(),
        }
    }

    /// Faces are served from `faces` in order before falling back to a
    /// zero-seeded generator. Placement picks always use the generator.
    pub fn from_scripted(faces: Vec<u32>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(0),
            script: faces.into(),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.script.clear();
    }

    fn face(&mut self, sides: u32) -> u32 {
        match self.script.pop_front() {
            Some(face) => face,
            None => self.rng.gen_range(1..=sides),
        }
    }

    fn sum(&mut self, sides: u32, count: u32) -> u32 {
        (0..count).map(|_| self.face(sides)).fold(0, u32::saturating_add)
    }

    /// Sum of `count` dice with `sides` faces. Advantage and disadvantage roll
    /// the whole pool twice and keep the higher or lower total.
    pub fn roll(&mut self, sides: u32, count: u32, mode: AdMode) -> u32 {
        match sides {
            0 => return 0,
            1 => return count,
            _ => {}
        }
        match mode {
            AdMode::Normal => self.sum(sides, count),
            AdMode::Advantage => {
                let a = self.sum(sides, count);
                let b = self.sum(sides, count);
                a.max(b)
            }
            AdMode::Disadvantage => {
                let a = self.sum(sides, count);
                let b = self.sum(sides, count);
                a.min(b)
            }
        }
    }

    pub fn d20(&mut self, mode: AdMode) -> u32 {
        self.roll(20, 1, mode)
    }

    /// Uniform index in `0..len`; `None` for an empty range.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }
}
