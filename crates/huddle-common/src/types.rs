use serde::{Deserialize, Serialize};
use std::fmt;

/// A room member as reported by the membership service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "userId")]
    pub id: String,
    #[serde(rename = "userName")]
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Which side started a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Outbound,
    Inbound,
}

/// Lifecycle of a call with one remote participant.
///
/// `Closed` is only ever reported in events; closed sessions are dropped
/// immediately and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Negotiating,
    Active,
    Closed,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Negotiating => "negotiating",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
