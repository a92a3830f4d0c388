//! Turn engine for one battle.
//!
//! An [`Encounter`] borrows the teams and the grid for the length of one
//! battle. [`Encounter::init_combat`] picks goals and rolls initiative once;
//! [`Encounter::step`] then plays one full round per call and reports whether
//! the battle goes on, so callers can render or pace between rounds.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::character::{Character, EntityError};
use crate::combat::resolve;
use crate::dice::Dice;
use crate::grid::{Grid, GridError};
use crate::ids::{EncounterId, TokenId};
use crate::path::step_toward;
use crate::stats::{AttackRecord, CombatLog, CombatantStats};
use crate::team::Team;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    #[error("an encounter needs at least two teams with living members, got {0}")]
    TooFewTeams(usize),
    #[error("combat must be initialized before rounds can run")]
    NotInitialized,
    #[error("combat has already been initialized")]
    AlreadyInitialized,
    #[error("encounter {0} has already concluded")]
    Concluded(EncounterId),
    #[error("character {0} is not part of this encounter")]
    UnknownCombatant(TokenId),
    #[error("character {0} is targeting an ally")]
    FriendlyTarget(TokenId),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Where a combatant lives: team index and member index within the team.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombatantRef {
    pub team: usize,
    pub member: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncounterState {
    Created,
    InitiativeRolled,
    Running,
    Won,
    Stalemate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Continuing { round: u32 },
    Won { round: u32, winner: usize },
    /// The round limit was reached with both sides still standing.
    Stalemate { round: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Conclusion {
    pub winner: Option<usize>,
    pub rounds: u32,
}

pub struct Encounter<'a> {
    id: EncounterId,
    teams: &'a mut [Team],
    grid: &'a mut Grid,
    combatants: Vec<CombatantRef>,
    lookup: HashMap<TokenId, CombatantRef>,
    /// Living enemies per team, in combatant order.
    enemies: Vec<Vec<TokenId>>,
    turn_order: Vec<(CombatantRef, i32)>,
    state: EncounterState,
    round: u32,
    round_limit: Option<u32>,
    winner: Option<usize>,
    log: CombatLog,
}

impl<'a> Encounter<'a> {
    pub fn new(id: EncounterId, teams: &'a mut [Team], grid: &'a mut Grid) -> Result<Self, EncounterError> {
        let fielded = teams.iter().filter(|t| t.alive_members().next().is_some()).count();
        if fielded < 2 {
            return Err(EncounterError::TooFewTeams(fielded));
        }

        let combatants: Vec<CombatantRef> = teams
            .iter()
            .enumerate()
            .flat_map(|(team, t)| (0..t.len()).map(move |member| CombatantRef { team, member }))
            .collect();
        let lookup = combatants
            .iter()
            .map(|c| (teams[c.team].members()[c.member].id(), *c))
            .collect();
        let enemies = (0..teams.len())
            .map(|team| {
                combatants
                    .iter()
                    .filter(|c| c.team != team)
                    .map(|c| &teams[c.team].members()[c.member])
                    .filter(|m| m.is_alive())
                    .map(Character::id)
                    .collect()
            })
            .collect();

        Ok(Self {
            id,
            teams,
            grid,
            combatants,
            lookup,
            enemies,
            turn_order: Vec::new(),
            state: EncounterState::Created,
            round: 0,
            round_limit: None,
            winner: None,
            log: CombatLog::new(),
        })
    }

    /// Conclude as a stalemate once `limit` rounds have been played.
    pub fn with_round_limit(mut self, limit: u32) -> Self {
        self.round_limit = Some(limit);
        self
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    pub fn teams(&self) -> &[Team] {
        self.teams
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn into_log(self) -> CombatLog {
        self.log
    }

    pub fn winner(&self) -> Option<&Team> {
        self.winner.map(|w| &self.teams[w])
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.winner
    }

    pub fn combatants(&self) -> impl Iterator<Item = &Character> {
        self.combatants.iter().map(|c| self.member(*c))
    }

    /// Combatant ids with their initiative, first to act first.
    pub fn turn_order(&self) -> Vec<(TokenId, i32)> {
        self.turn_order.iter().map(|(c, init)| (self.member(*c).id(), *init)).collect()
    }

    pub fn combatant(&self, id: TokenId) -> Result<&Character, EncounterError> {
        let c = self.locate(id)?;
        Ok(self.member(c))
    }

    pub fn team_of(&self, id: TokenId) -> Result<&Team, EncounterError> {
        let c = self.locate(id)?;
        Ok(&self.teams[c.team])
    }

    /// Living enemies of team `team`.
    pub fn enemies_of(&self, team: usize) -> &[TokenId] {
        self.enemies.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    fn locate(&self, id: TokenId) -> Result<CombatantRef, EncounterError> {
        self.lookup.get(&id).copied().ok_or(EncounterError::UnknownCombatant(id))
    }

    fn member(&self, c: CombatantRef) -> &Character {
        &self.teams[c.team].members()[c.member]
    }

    fn member_mut(&mut self, c: CombatantRef) -> &mut Character {
        &mut self.teams[c.team].members_mut()[c.member]
    }

    /// Point every living combatant at its nearest living enemy. Ties go to
    /// the enemy listed first.
    fn set_goals(&mut self) -> Result<(), EncounterError> {
        for i in 0..self.combatants.len() {
            let c = self.combatants[i];
            if !self.member(c).is_alive() {
                continue;
            }
            let here = self.grid.position(self.member(c).id())?;
            let mut best: Option<(u32, TokenId)> = None;
            for enemy in &self.enemies[c.team] {
                let d = here.manhattan(self.grid.position(*enemy)?);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, *enemy));
                }
            }
            let goal = best.map(|(_, id)| id);
            debug!(encounter = %self.id, combatant = %self.member(c).id(), goal = ?goal, "goal selected");
            self.member_mut(c).goal = goal;
        }
        Ok(())
    }

    pub fn init_combat(&mut self, dice: &mut Dice) -> Result<(), EncounterError> {
        if self.state != EncounterState::Created {
            return Err(EncounterError::AlreadyInitialized);
        }
        self.set_goals()?;
        let mut order: Vec<(CombatantRef, i32)> = self
            .combatants
            .iter()
            .map(|c| (*c, self.member(*c).roll_initiative(dice)))
            .collect();
        // stable: equal rolls keep enumeration order
        order.sort_by(|a, b| b.1.cmp(&a.1));
        self.turn_order = order;
        debug!(encounter = %self.id, order = ?self.turn_order(), "initiative rolled");
        self.state = EncounterState::InitiativeRolled;
        Ok(())
    }

    /// Play one full round. Every living combatant, in initiative order,
    /// moves toward its goal and attacks it once if adjacent.
    pub fn step(&mut self, dice: &mut Dice) -> Result<RoundOutcome, EncounterError> {
        match self.state {
            EncounterState::Created => return Err(EncounterError::NotInitialized),
            EncounterState::Won | EncounterState::Stalemate => return Err(EncounterError::Concluded(self.id)),
            EncounterState::InitiativeRolled | EncounterState::Running => {}
        }
        self.state = EncounterState::Running;

        for turn in 0..self.turn_order.len() {
            let (c, _) = self.turn_order[turn];
            if let Some(winner) = self.take_turn(c, dice)? {
                self.round += 1;
                self.winner = Some(winner);
                self.state = EncounterState::Won;
                info!(
                    encounter = %self.id,
                    winner = self.teams[winner].name(),
                    rounds = self.round,
                    "encounter won"
                );
                return Ok(RoundOutcome::Won {
                    round: self.round,
                    winner,
                });
            }
        }

        self.round += 1;
        self.grid.verify()?;
        if self.round_limit.is_some_and(|limit| self.round >= limit) {
            warn!(encounter = %self.id, rounds = self.round, "round limit reached, calling a stalemate");
            self.state = EncounterState::Stalemate;
            return Ok(RoundOutcome::Stalemate { round: self.round });
        }
        Ok(RoundOutcome::Continuing { round: self.round })
    }

    /// Returns the winning team when this turn ends the battle.
    fn take_turn(&mut self, c: CombatantRef, dice: &mut Dice) -> Result<Option<usize>, EncounterError> {
        let actor = self.member(c);
        if !actor.is_alive() {
            return Ok(None);
        }
        let Some(goal) = actor.goal else {
            return Ok(None);
        };
        let id = actor.id();
        let speed = actor.speed();

        let here = self.grid.position(id)?;
        let target = self.grid.position(goal)?;
        let dest = step_toward(here, target, &self.grid.adjacency(), speed);
        self.grid.move_to(id, dest)?;

        if !self.grid.is_adjacent(id, goal)? {
            return Ok(None);
        }

        let g = self.locate(goal)?;
        let (attacker, victim) = split_pair(self.teams, c, g)?;
        let outcome = resolve(attacker, victim, dice)?;
        self.log.push(AttackRecord {
            encounter_id: self.id,
            attacker_id: id,
            attacker_name: attacker.name().to_string(),
            victim_id: goal,
            victim_name: victim.name().to_string(),
            hit: outcome.hit,
            damage: outcome.damage,
        });
        if victim.is_alive() {
            return Ok(None);
        }

        debug!(encounter = %self.id, killer = %attacker, fallen = %victim, "combatant down");
        self.grid.remove(goal)?;
        for list in &mut self.enemies {
            list.retain(|e| *e != goal);
        }
        if self.enemies[c.team].is_empty() {
            return Ok(Some(c.team));
        }
        self.set_goals()?;
        Ok(None)
    }

    /// Play rounds until the battle concludes.
    pub fn run(&mut self, dice: &mut Dice) -> Result<Conclusion, EncounterError> {
        loop {
            match self.step(dice)? {
                RoundOutcome::Continuing { .. } => continue,
                RoundOutcome::Won { round, winner } => {
                    return Ok(Conclusion {
                        winner: Some(winner),
                        rounds: round,
                    });
                }
                RoundOutcome::Stalemate { round } => {
                    return Ok(Conclusion {
                        winner: None,
                        rounds: round,
                    });
                }
            }
        }
    }

    /// Per-combatant stats for this battle, one entry per combatant.
    pub fn stats(&self) -> Vec<(&Character, CombatantStats)> {
        let totals = self.log.summarize();
        self.combatants()
            .map(|m| {
                let stats = totals.get(&m.id()).cloned().unwrap_or_else(|| CombatantStats {
                    name: m.name().to_string(),
                    ..Default::default()
                });
                (m, stats)
            })
            .collect()
    }

    /// `name_id: Dealt: .., Taken: .., Hit Ratio: ..` for every combatant.
    pub fn summary(&self) -> Vec<String> {
        self.stats()
            .into_iter()
            .map(|(m, s)| format!("{m}: {}", s.summary_line()))
            .collect()
    }
}

impl fmt::Display for Encounter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.teams.iter().map(Team::name).collect();
        f.write_str(&names.join(" vs. "))
    }
}

/// Borrow an attacker and its victim from two different teams at once.
fn split_pair(
    teams: &mut [Team],
    attacker: CombatantRef,
    victim: CombatantRef,
) -> Result<(&Character, &mut Character), EncounterError> {
    use std::cmp::Ordering;

    match attacker.team.cmp(&victim.team) {
        Ordering::Less => {
            let (left, right) = teams.split_at_mut(victim.team);
            Ok((
                &left[attacker.team].members()[attacker.member],
                &mut right[0].members_mut()[victim.member],
            ))
        }
        Ordering::Greater => {
            let (left, right) = teams.split_at_mut(attacker.team);
            Ok((
                &right[0].members()[attacker.member],
                &mut left[victim.team].members_mut()[victim.member],
            ))
        }
        Ordering::Equal => {
            let id = teams[attacker.team].members()[attacker.member].id();
            Err(EncounterError::FriendlyTarget(id))
        }
    }
}

/// Place every member of every team on `grid`, team `i` drawing from start
/// zone `i` when the grid has one. Members that no longer fit are dropped
/// from their team. Returns how many were dropped.
pub fn deploy(teams: &mut [Team], grid: &mut Grid, dice: &mut Dice) -> Result<usize, GridError> {
    let mut dropped = 0;
    for (slot, team) in teams.iter_mut().enumerate() {
        let mut overflow = Vec::new();
        for member in team.members() {
            if !grid.add(member.token(), None, Some(slot), dice)? {
                overflow.push(member.id());
            }
        }
        for id in overflow {
            if let Some(member) = team.remove_member(id) {
                warn!(team = team.name(), member = %member, "grid is full, shrinking team");
                dropped += 1;
            }
        }
    }
    Ok(dropped)
}
