//! Parsing of planner response bodies.
//!
//! The planner's output is trusted: a body is accepted if it deserialises
//! into the expected shape. Numbers are not checked.

use serde::Deserialize;
use thiserror::Error;

use super::types::{Meal, WeeklyPlan};

/// Errors that can occur while parsing a planner response body.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("planner returned no data")]
    EmptyResponse,

    #[error("planner response is not a valid {expected}: {source}")]
    Malformed {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Wrapper object for the alternatives response.
#[derive(Debug, Deserialize)]
struct AlternativesBody {
    alternatives: Vec<Meal>,
}

/// Parse a weekly plan JSON document.
pub fn parse_weekly_plan(body: &str) -> Result<WeeklyPlan, PlanParseError> {
    let body = non_empty(body)?;
    serde_json::from_str(body).map_err(|source| PlanParseError::Malformed {
        expected: "weekly plan",
        source,
    })
}

/// Parse an alternatives document: `{"alternatives": [Meal, ...]}`.
///
/// Any number of meals is accepted, including none.
pub fn parse_alternatives(body: &str) -> Result<Vec<Meal>, PlanParseError> {
    let body = non_empty(body)?;
    let parsed: AlternativesBody =
        serde_json::from_str(body).map_err(|source| PlanParseError::Malformed {
            expected: "alternatives list",
            source,
        })?;
    Ok(parsed.alternatives)
}

fn non_empty(body: &str) -> Result<&str, PlanParseError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Err(PlanParseError::EmptyResponse)
    } else {
        Ok(trimmed)
    }
}
