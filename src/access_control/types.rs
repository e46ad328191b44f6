//! Access control types
//!
//! Core types used by the rule evaluator: the request being checked, the
//! user it is made on behalf of, and the verdict handed back to the caller.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether a rule grants or refuses access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Allow,
    Deny,
}

impl RuleType {
    /// Get the rule type as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleType::Allow => "allow",
            RuleType::Deny => "deny",
        }
    }

    pub const fn is_allow(&self) -> bool {
        matches!(self, RuleType::Allow)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user a request is made on behalf of
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Roles held by the user, compared case-insensitively
    #[serde(default)]
    pub roles: Vec<String>,

    /// Account status (e.g. "approved", "pending")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl User {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A single request to be checked against the rule set
///
/// `valid` carries the outcome of token verification, which happens
/// upstream. A missing value is treated as an invalid token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Raw request path, matched as-is against route patterns
    pub url: String,

    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub valid: bool,
}

impl AccessRequest {
    pub fn new(url: impl Into<String>, user: User) -> Self {
        Self {
            url: url.into(),
            user,
            valid: false,
        }
    }

    pub fn with_valid_token(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }
}

/// Structured refusal returned to the caller
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("{message} ({code})")]
pub struct Denial {
    pub code: u16,
    pub message: &'static str,
}

impl Denial {
    /// A deny rule applied, or nothing authorized the request
    pub const FORBIDDEN: Denial = Denial {
        code: 403,
        message: "forbidden",
    };

    /// An allow rule applied but the caller's token did not verify
    pub const UNAUTHORIZED: Denial = Denial {
        code: 401,
        message: "unauthorized",
    };
}

/// Outcome of evaluating a request
///
/// Serializes as `0` when granted and as `{"code": .., "message": ..}` when
/// denied, which is the shape HTTP-facing callers translate into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    Denied(Denial),
}

impl Verdict {
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Denied(_))
    }

    /// Status code of the verdict, `0` for granted
    pub fn code(&self) -> u16 {
        match self {
            Verdict::Granted => 0,
            Verdict::Denied(denial) => denial.code,
        }
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Verdict::Granted => Ok(()),
            Verdict::Denied(denial) => Err(denial),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Granted => write!(f, "granted"),
            Verdict::Denied(denial) => write!(f, "denied: {}", denial),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Verdict::Granted => serializer.serialize_u8(0),
            Verdict::Denied(denial) => denial.serialize(serializer),
        }
    }
}
