//! Bundled challenges (five per dataset)

use super::Level;
use crate::error::Result;
use crate::feedback::ExpectedOutput;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    pub title: String,
    pub level: Level,
    /// Dataset the query runs against
    pub dataset: String,
    /// Task statement shown to the user
    pub problem: String,
    pub expected_output: ExpectedOutput,
    /// Reference solution
    pub solution: String,
    /// Progressive hints, revealed one at a time
    #[serde(default)]
    pub hints: Vec<String>,
}

const CHALLENGES: &str = include_str!("../../data/challenges.json");

pub(crate) fn load_bundled() -> Result<Vec<Challenge>> {
    let mut challenges: Vec<Challenge> = serde_json::from_str(CHALLENGES)?;
    challenges.sort_by_key(|c| c.id);
    Ok(challenges)
}
