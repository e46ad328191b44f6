//! Compiled access rules
//!
//! A [`RuleConfig`] is validated and compiled once at load time. Role and
//! status constraints are stored lowercased so that per-request matching is a
//! plain comparison against the lowercased user attributes.

use crate::access_control::patterns::RouteMatcher;
use crate::access_control::types::{RuleType, User};
use crate::config::{RouteMatching, RuleConfig};
use crate::error::ConfigError;
use tracing::warn;

/// A rule ready for evaluation
#[derive(Debug)]
pub struct CompiledRule {
    kind: RuleType,
    routes: RouteMatcher,
    roles: Option<Vec<String>>,
    statuses: Option<Vec<String>>,
    token_exempt: bool,
}

impl CompiledRule {
    /// Validate and compile a rule
    ///
    /// `index` is the rule's position in the list and is only used in error
    /// messages.
    pub fn compile(
        index: usize,
        config: &RuleConfig,
        matching: RouteMatching,
    ) -> Result<Self, ConfigError> {
        if config.route.is_empty() {
            return Err(ConfigError::invalid_rule(index, "route list is empty"));
        }

        let routes = RouteMatcher::new(&config.route, matching).map_err(|e| match e {
            ConfigError::InvalidPattern { pattern, reason } => ConfigError::InvalidPattern {
                pattern,
                reason: format!("in access_control.rules[{}].route: {}", index, reason),
            },
            other => other,
        })?;

        if config.token_exempt && config.kind == RuleType::Deny {
            warn!(rule = index, "token_exempt has no effect on a deny rule");
        }

        Ok(Self {
            kind: config.kind,
            routes,
            roles: normalize(index, "role", config.role.as_deref())?,
            statuses: normalize(index, "status", config.status.as_deref())?,
            token_exempt: config.token_exempt,
        })
    }

    pub fn kind(&self) -> RuleType {
        self.kind
    }

    pub fn is_token_exempt(&self) -> bool {
        self.token_exempt
    }

    /// Check whether this rule applies to a request, returning the matched
    /// route pattern
    ///
    /// `user_roles` and `user_status` must already be lowercased.
    pub fn applies(
        &self,
        path: &str,
        user_roles: &[String],
        user_status: Option<&str>,
    ) -> Option<&str> {
        let pattern = self.routes.find_match(path)?;

        if let Some(roles) = &self.roles
            && !user_roles.iter().any(|role| roles.contains(role))
        {
            return None;
        }

        if let Some(statuses) = &self.statuses {
            match user_status {
                Some(status) if statuses.iter().any(|s| s == status) => {}
                _ => return None,
            }
        }

        Some(pattern)
    }
}

/// Lowercased view of a user's roles and status
#[derive(Debug)]
pub(crate) struct NormalizedUser {
    pub roles: Vec<String>,
    pub status: Option<String>,
}

impl NormalizedUser {
    pub fn new(user: &User) -> Self {
        Self {
            roles: user.roles.iter().map(|r| r.to_lowercase()).collect(),
            status: user.status.as_deref().map(str::to_lowercase),
        }
    }
}

fn normalize(
    index: usize,
    field: &str,
    values: Option<&[String]>,
) -> Result<Option<Vec<String>>, ConfigError> {
    let Some(values) = values else {
        return Ok(None);
    };

    if values.is_empty() {
        return Err(ConfigError::invalid_rule(
            index,
            format!("{} list is empty", field),
        ));
    }

    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ConfigError::invalid_rule(
            index,
            format!("{} contains an empty value", field),
        ));
    }

    Ok(Some(values.iter().map(|v| v.to_lowercase()).collect()))
}
