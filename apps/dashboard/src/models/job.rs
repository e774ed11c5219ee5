use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::models::skills::IdentifiedSkills;

/// Characters of the job description kept on the `/data` page.
pub const DISPLAY_DESCRIPTION_CHARS: usize = 100;
pub const TRUNCATION_MARKER: &str = "...";

/// One job posting as fetched from upstream and stored in the cache.
///
/// The same serde shape is used for the cache encoding and the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub position_type: String,
    pub job_description: String,
    /// Kept in the upstream number form, so `50000` stays an integer.
    pub salary: Number,
    pub identified_skills: IdentifiedSkills,
}

impl JobPosting {
    /// Returns a copy for display with the description cut to
    /// `DISPLAY_DESCRIPTION_CHARS` characters and the marker appended.
    /// `self` is left untouched.
    pub fn display_copy(&self) -> JobPosting {
        let mut description: String = self
            .job_description
            .chars()
            .take(DISPLAY_DESCRIPTION_CHARS)
            .collect();
        description.push_str(TRUNCATION_MARKER);

        JobPosting {
            job_description: description,
            ..self.clone()
        }
    }

    /// Byte form pushed onto the cache list.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
pub(crate) fn sample_posting(position_type: &str, skills: &[&str]) -> JobPosting {
    JobPosting {
        title: "Machine Learning Engineer".to_string(),
        company: "Acme".to_string(),
        location: "Gothenburg".to_string(),
        position_type: position_type.to_string(),
        job_description: "Build models.".to_string(),
        salary: Number::from(50_000),
        identified_skills: IdentifiedSkills::List(skills.iter().map(|s| s.to_string()).collect()),
    }
}
