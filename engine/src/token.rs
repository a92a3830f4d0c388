use std::fmt;

use crate::ids::{IdAllocator, TokenId};

pub const WALL_NAME: &str = "wall";
pub const WALL_ICON: char = '#';

/// Anything that can sit on a grid cell: characters, walls, markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    pub icon: char,
}

impl Token {
    pub fn new(ids: &mut IdAllocator, name: impl Into<String>, icon: char) -> Self {
        Self {
            id: ids.next_token(),
            name: name.into(),
            icon,
        }
    }

    /// A generic `token`/`t` token.
    pub fn generic(ids: &mut IdAllocator) -> Self {
        Self::new(ids, "token", 't')
    }

    pub fn wall(ids: &mut IdAllocator) -> Self {
        Self::new(ids, WALL_NAME, WALL_ICON)
    }

    /// `name_id`, the label used in logs and summaries.
    pub fn label(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.icon)
    }
}
