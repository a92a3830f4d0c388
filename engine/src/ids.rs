use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(pub u32);

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Hands out monotonically increasing ids. One allocator per simulation
/// context; ids start at 1.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last_token: u32,
    last_encounter: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&mut self) -> TokenId {
        self.last_token += 1;
        TokenId(self.last_token)
    }

    pub fn next_encounter(&mut self) -> EncounterId {
        self.last_encounter += 1;
        EncounterId(self.last_encounter)
    }
}
