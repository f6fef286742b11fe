use crate::utils::error::{AssertError, Result};
use serde::Serialize;

/// Outcome of checking a matcher against a subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub satisfied: bool,
    /// Human readable predicate, e.g. `config node "a/b" equals "1"`.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Evaluation {
    pub fn new(satisfied: bool, description: impl Into<String>) -> Self {
        Self {
            satisfied,
            description: description.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_diff(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Failure text: the predicate followed by an expected/actual diff when both sides are known.
    pub fn failure_description(&self) -> String {
        let mut out = format!("Failed asserting that {}.", self.description);
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            out.push_str("\n--- Expected\n+++ Actual");
            for line in expected.lines() {
                out.push_str("\n-");
                out.push_str(line);
            }
            for line in actual.lines() {
                out.push_str("\n+");
                out.push_str(line);
            }
        }
        out
    }
}

pub trait Matcher<S: ?Sized> {
    fn evaluate(&self, subject: &S) -> Evaluation;
}

/// Checks `matcher` against `subject`, failing with `message` and a diff when it does not hold.
pub fn assert_that<S, M>(subject: &S, matcher: &M, message: &str) -> Result<()>
where
    S: ?Sized,
    M: Matcher<S> + ?Sized,
{
    let evaluation = matcher.evaluate(subject);
    tracing::debug!(
        satisfied = evaluation.satisfied,
        "checked {}",
        evaluation.description
    );

    if evaluation.satisfied {
        return Ok(());
    }

    tracing::warn!("assertion failed: {}", evaluation.description);
    Err(AssertError::AssertionFailed {
        message: message.to_string(),
        description: evaluation.failure_description(),
    })
}
