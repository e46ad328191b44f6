//! Configuration types for route-warden
//!
//! This module defines the configuration structure that can be loaded from
//! TOML/JSON files and/or environment variables.

use crate::access_control::RuleType;
use serde::{Deserialize, Deserializer};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Access rules and how they are evaluated
    pub access_control: AccessControlConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Access control configuration
///
/// `rules` is an ordered list. Reordering it changes outcomes: in
/// `first_match` mode the first applying rule decides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// How applying rules are combined into a verdict
    pub mode: EvaluationMode,

    /// How route patterns are matched against the request path
    pub route_matching: RouteMatching,

    /// Outcome when no rule applies
    pub default_policy: DefaultPolicy,

    /// Ordered rule list
    pub rules: Vec<RuleConfig>,
}

/// Rule combination strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// The first applying rule decides
    #[default]
    FirstMatch,
    /// Any applying allow rule wins over applying deny rules
    AllowOverrides,
}

/// Route pattern matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMatching {
    /// Pattern must match the whole path
    #[default]
    Full,
    /// Pattern may match anywhere in the path
    Partial,
}

/// Outcome when no rule applies to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    /// Refuse with 403
    #[default]
    Deny,
    /// Treat as an implicit allow rule (token check still applies)
    Allow,
}

/// A single declarative rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    #[serde(rename = "type")]
    pub kind: RuleType,

    /// Route patterns (regex)
    pub route: Vec<String>,

    /// Roles the rule is restricted to; a single string or a list
    #[serde(default, deserialize_with = "one_or_many")]
    pub role: Option<Vec<String>>,

    /// Statuses the rule is restricted to; a single string or a list
    #[serde(default, deserialize_with = "one_or_many")]
    pub status: Option<Vec<String>>,

    /// Skip the token validity check when this allow rule applies
    #[serde(default, alias = "tokenExempt")]
    pub token_exempt: bool,
}

impl RuleConfig {
    pub fn allow<I, S>(route: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RuleType::Allow, route)
    }

    pub fn deny<I, S>(route: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RuleType::Deny, route)
    }

    fn new<I, S>(kind: RuleType, route: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            route: route.into_iter().map(Into::into).collect(),
            role: None,
            status: None,
            token_exempt: false,
        }
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.status = Some(statuses.into_iter().map(Into::into).collect());
        self
    }

    pub fn exempt_from_token(mut self) -> Self {
        self.token_exempt = true;
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(single) => vec![single],
            OneOrMany::Many(list) => list,
        }),
    )
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
