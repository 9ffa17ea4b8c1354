use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque member identifier as handed out by the member directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&MemberId> for MemberId {
    fn from(value: &MemberId) -> Self {
        value.clone()
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single sign-up on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRegistration {
    pub member_id: MemberId,
    pub registered_at: Option<DateTime<Utc>>,
}

impl MemberRegistration {
    pub fn create(member_id: MemberId) -> Self {
        Self {
            member_id,
            registered_at: Some(Utc::now()),
        }
    }
}
