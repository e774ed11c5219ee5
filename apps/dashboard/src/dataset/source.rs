//! Upstream dataset source: a single bounded-timeout GET of a JSON array.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{IdentifiedSkills, JobPosting};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: u16 },

    #[error("upstream body is not JSON: {0}")]
    Body(String),

    #[error("upstream body is not a JSON array")]
    NotAnArray,
}

/// Where the raw dataset comes from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches the full dataset as untyped JSON items, in upstream order.
    async fn fetch(&self) -> Result<Vec<Value>, FetchError>;
}

#[derive(Clone)]
pub struct HttpDatasetSource {
    client: Client,
    url: String,
}

impl HttpDatasetSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        items_from_body(&body)
    }
}

fn items_from_body(body: &[u8]) -> Result<Vec<Value>, FetchError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(FetchError::NotAnArray),
        Err(e) => Err(FetchError::Body(e.to_string())),
    }
}

/// Wire shape of one upstream item. Every field is required.
#[derive(Debug, Deserialize)]
struct UpstreamJob {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Type of Positions")]
    position_type: String,
    #[serde(rename = "Job Description")]
    job_description: String,
    #[serde(rename = "Salary")]
    salary: Number,
    #[serde(rename = "Identified_Skills")]
    identified_skills: IdentifiedSkills,
}

impl From<UpstreamJob> for JobPosting {
    fn from(job: UpstreamJob) -> Self {
        JobPosting {
            title: job.title,
            company: job.company,
            location: job.location,
            position_type: job.position_type,
            job_description: job.job_description,
            salary: job.salary,
            identified_skills: job.identified_skills,
        }
    }
}

/// Converts one upstream item. The skills field is kept in whatever shape
/// it was delivered in. Missing or mistyped fields are an error, never a default.
pub fn parse_record(item: Value) -> Result<JobPosting, serde_json::Error> {
    serde_json::from_value::<UpstreamJob>(item).map(JobPosting::from)
}

/// Serves a fixed payload and counts how often it was asked.
#[cfg(test)]
pub struct StaticSource {
    payload: Result<Vec<Value>, u16>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl StaticSource {
    pub fn items(items: Vec<Value>) -> Self {
        Self {
            payload: Ok(items),
            calls: Default::default(),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            payload: Err(status),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl DatasetSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.payload {
            Ok(items) => Ok(items.clone()),
            Err(status) => Err(FetchError::Status { status: *status }),
        }
    }
}

#[cfg(test)]
pub(crate) fn upstream_item(position_type: &str, skills: Value) -> Value {
    serde_json::json!({
        "Title": "A",
        "Company": "X",
        "Location": "Y",
        "Type of Positions": position_type,
        "Job Description": "...",
        "Salary": 50000,
        "Identified_Skills": skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_record_maps_upstream_names() {
        let job = parse_record(upstream_item("ML", json!(["Python"]))).unwrap();
        assert_eq!(job.title, "A");
        assert_eq!(job.company, "X");
        assert_eq!(job.location, "Y");
        assert_eq!(job.position_type, "ML");
        assert_eq!(job.job_description, "...");
        assert_eq!(job.salary, Number::from(50_000));
        assert_eq!(
            job.identified_skills,
            IdentifiedSkills::List(vec!["Python".to_string()])
        );
    }

    #[test]
    fn test_parse_record_keeps_encoded_skills_as_delivered() {
        let job = parse_record(upstream_item("ML", json!("['Python', 'SQL']"))).unwrap();
        assert_eq!(
            job.identified_skills,
            IdentifiedSkills::Encoded("['Python', 'SQL']".to_string())
        );
    }

    #[test]
    fn test_parse_record_rejects_missing_field() {
        let mut item = upstream_item("ML", json!([]));
        item.as_object_mut().unwrap().remove("Salary");
        let err = parse_record(item).unwrap_err();
        assert!(err.to_string().contains("Salary"));
    }

    #[test]
    fn test_parse_record_rejects_non_numeric_salary() {
        let mut item = upstream_item("ML", json!([]));
        item["Salary"] = json!("lots");
        assert!(parse_record(item).is_err());
    }

    #[test]
    fn test_parse_record_rejects_null_salary() {
        let mut item = upstream_item("ML", json!([]));
        item["Salary"] = Value::Null;
        assert!(parse_record(item).is_err());
    }

    #[test]
    fn test_items_from_body_requires_json_array() {
        assert_eq!(items_from_body(b"[1, 2]").unwrap().len(), 2);
        assert!(matches!(
            items_from_body(br#"{"a": 1}"#),
            Err(FetchError::NotAnArray)
        ));
        assert!(matches!(
            items_from_body(b"<html>oops</html>"),
            Err(FetchError::Body(_))
        ));
    }
}
