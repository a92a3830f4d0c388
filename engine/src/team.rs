use std::fmt;

use crate::character::{Character, EntityError};
use crate::ids::TokenId;

/// Characters fighting on the same side.
#[derive(Debug, Clone)]
pub struct Team {
    name: String,
    members: Vec<Character>,
}

impl Team {
    pub fn new(name: impl Into<String>, members: Vec<Character>) -> Result<Self, EntityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EntityError::EmptyTeamName);
        }
        Ok(Self { name, members })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Character] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Character] {
        &mut self.members
    }

    pub fn alive_members(&self) -> impl Iterator<Item = &Character> {
        self.members.iter().filter(|m| m.is_alive())
    }

    pub fn remove_member(&mut self, id: TokenId) -> Option<Character> {
        let idx = self.members.iter().position(|m| m.id() == id)?;
        Some(self.members.remove(idx))
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
