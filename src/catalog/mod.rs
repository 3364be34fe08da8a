//! Static challenge and dataset definitions shipped with the crate.

pub mod challenges;
pub mod datasets;

pub use challenges::Challenge;
pub use datasets::{Dataset, QueryExample};

use crate::error::{PracticeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Beginner => write!(f, "Beginner"),
            Level::Intermediate => write!(f, "Intermediate"),
        }
    }
}

/// All challenges and datasets, indexed by id and name
#[derive(Debug, Clone)]
pub struct Catalog {
    challenges: Vec<Challenge>,
    datasets: Vec<Dataset>,
}

impl Catalog {
    /// Parse the definitions embedded in the binary.
    pub fn bundled() -> Result<Self> {
        let catalog = Self {
            challenges: challenges::load_bundled()?,
            datasets: datasets::load_bundled()?,
        };
        catalog.check_references()?;
        Ok(catalog)
    }

    fn check_references(&self) -> Result<()> {
        for challenge in &self.challenges {
            if self.dataset(&challenge.dataset).is_none() {
                return Err(PracticeError::Challenge(format!(
                    "Challenge {} refers to unknown dataset '{}'",
                    challenge.id, challenge.dataset
                )));
            }
        }
        Ok(())
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn challenge(&self, id: u32) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    pub fn challenges_for<'a>(&'a self, dataset: &'a str) -> impl Iterator<Item = &'a Challenge> + 'a {
        self.challenges.iter().filter(move |c| c.dataset == dataset)
    }

    /// Id of the challenge after `id`, or `None` once the last one is reached.
    pub fn next_challenge_id(&self, id: u32) -> Option<u32> {
        self.challenges.iter().map(|c| c.id).find(|&next| next > id)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn dataset_names(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.name.as_str()).collect()
    }
}
