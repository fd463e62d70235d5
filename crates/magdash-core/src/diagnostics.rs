//! Result records for backend connectivity checks.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Success,
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "pending"),
            TestStatus::Success => write!(f, "success"),
            TestStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TestResult {
    pub fn pending(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Pending, message)
    }

    pub fn success(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Success, message)
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Error, message)
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Success
    }

    fn new(name: impl Into<String>, status: TestStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.name, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}
