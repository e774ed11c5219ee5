//! Frequency statistics over the dataset.
//!
//! Two fixed key policies: one count per posting under its position type, or
//! one count per distinct skill of each posting (fan-out). Records whose skills
//! cannot be decoded are skipped and reported; partial statistics are returned.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::models::skills::SkillsParseError;
use crate::models::{IdentifiedSkills, JobPosting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPolicy {
    ByPositionType,
    BySkill,
}

#[derive(Debug, Error)]
#[error("record {index} has undecodable skills {raw:?}: {source}")]
pub struct AggregationError {
    pub index: usize,
    pub raw: String,
    #[source]
    pub source: SkillsParseError,
}

/// Key → occurrence count. Keys serialize in lexical order.
pub type Counts = BTreeMap<String, usize>;

#[derive(Debug, Default)]
pub struct Tally {
    pub counts: Counts,
    /// Records left out because their contribution could not be computed.
    pub skipped: Vec<AggregationError>,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// (key, count) pairs by count descending, ties by key ascending.
    pub fn sorted_desc(&self) -> Vec<(String, usize)> {
        sort_desc(&self.counts)
    }
}

pub fn aggregate(dataset: &[JobPosting], policy: StatsPolicy) -> Tally {
    let mut tally = Tally::default();

    for (index, job) in dataset.iter().enumerate() {
        match policy {
            StatsPolicy::ByPositionType => {
                *tally.counts.entry(job.position_type.clone()).or_insert(0) += 1;
            }
            StatsPolicy::BySkill => match job.identified_skills.tokens() {
                Ok(tokens) => {
                    for token in tokens {
                        *tally.counts.entry(token).or_insert(0) += 1;
                    }
                }
                Err(source) => {
                    let err = AggregationError {
                        index,
                        raw: match &job.identified_skills {
                            IdentifiedSkills::Encoded(text) => text.clone(),
                            other => format!("{other:?}"),
                        },
                        source,
                    };
                    warn!("Skipping record in skill statistics: {err}");
                    tally.skipped.push(err);
                }
            },
        }
    }

    tally
}

pub fn sort_desc(counts: &Counts) -> Vec<(String, usize)> {
    let mut pairs: Vec<(String, usize)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // BTreeMap iteration is already key-ordered, so a stable sort keeps ties by key.
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs
}
