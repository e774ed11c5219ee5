pub mod job;
pub mod skills;

pub use job::JobPosting;
pub use skills::IdentifiedSkills;
