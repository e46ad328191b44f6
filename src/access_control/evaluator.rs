//! Access rule evaluator
//!
//! Evaluates a request against an ordered rule list. Rule order is part of
//! the contract: in [`EvaluationMode::FirstMatch`] the first applying rule
//! decides and later rules are never consulted.
//!
//! Outcomes:
//! - applying `deny` rule: 403 forbidden
//! - applying `allow` rule with `token_exempt`: granted
//! - applying `allow` rule otherwise: granted if the token is valid, else 401
//! - nothing applies: the configured [`DefaultPolicy`]

use crate::access_control::rules::{CompiledRule, NormalizedUser};
use crate::access_control::types::{AccessRequest, Denial, RuleType, Verdict};
use crate::config::{AccessControlConfig, DefaultPolicy, EvaluationMode, RuleConfig};
use crate::error::ConfigError;
use serde::Serialize;
use tracing::{debug, trace};

/// Stateless evaluator over a compiled rule set
///
/// Immutable after construction; share it behind an `Arc` across threads.
#[derive(Debug)]
pub struct RuleEvaluator {
    rules: Vec<CompiledRule>,
    mode: EvaluationMode,
    default_policy: DefaultPolicy,
}

/// The rule that decided a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRule {
    /// Position in the configured rule list
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: RuleType,
    /// Route pattern that matched the path
    pub pattern: String,
    pub token_exempt: bool,
}

/// Verdict together with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// `None` when the default policy decided
    pub rule: Option<MatchedRule>,
}

impl RuleEvaluator {
    /// Create a new evaluator from configuration
    pub fn new(config: &AccessControlConfig) -> Result<Self, ConfigError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index, rule, config.route_matching))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            rules = rules.len(),
            mode = ?config.mode,
            default_policy = ?config.default_policy,
            "Compiled access rules"
        );

        Ok(Self {
            rules,
            mode: config.mode,
            default_policy: config.default_policy,
        })
    }

    /// Create a first-match, default-deny evaluator from a rule list
    pub fn from_rules(rules: &[RuleConfig]) -> Result<Self, ConfigError> {
        Self::new(&AccessControlConfig {
            rules: rules.to_vec(),
            ..Default::default()
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Evaluate a request
    pub fn evaluate(&self, request: &AccessRequest) -> Verdict {
        self.explain(request).verdict
    }

    /// Evaluate a request, returning an error if denied
    pub fn require(&self, request: &AccessRequest) -> Result<(), Denial> {
        self.evaluate(request).into_result()
    }

    /// Evaluate a request and report which rule decided it
    pub fn explain(&self, request: &AccessRequest) -> Evaluation {
        debug!(
            url = %request.url,
            roles = ?request.user.roles,
            status = ?request.user.status,
            valid = request.valid,
            mode = ?self.mode,
            "Checking access"
        );

        let user = NormalizedUser::new(&request.user);

        let decided = match self.mode {
            EvaluationMode::FirstMatch => self.first_match(request, &user),
            EvaluationMode::AllowOverrides => self.allow_overrides(request, &user),
        };

        let evaluation = match decided {
            Some((index, pattern)) => {
                let rule = &self.rules[index];
                Evaluation {
                    verdict: apply(rule.kind(), rule.is_token_exempt(), request.valid),
                    rule: Some(MatchedRule {
                        index,
                        kind: rule.kind(),
                        pattern: pattern.to_string(),
                        token_exempt: rule.is_token_exempt(),
                    }),
                }
            }
            None => {
                trace!("No rule applied, using default policy: {:?}", self.default_policy);
                let verdict = match self.default_policy {
                    DefaultPolicy::Deny => Verdict::Denied(Denial::FORBIDDEN),
                    DefaultPolicy::Allow => apply(RuleType::Allow, false, request.valid),
                };
                Evaluation {
                    verdict,
                    rule: None,
                }
            }
        };

        debug!(url = %request.url, verdict = %evaluation.verdict, "Access decided");
        evaluation
    }

    /// First applying rule, in list order
    fn first_match<'a>(
        &'a self,
        request: &'a AccessRequest,
        user: &'a NormalizedUser,
    ) -> Option<(usize, &'a str)> {
        self.applying(request, user).next()
    }

    /// Applying allow rules win over applying deny rules. Among allow rules a
    /// token-exempt one is preferred, so a single exempt rule is enough to skip
    /// the token check.
    fn allow_overrides<'a>(
        &'a self,
        request: &'a AccessRequest,
        user: &'a NormalizedUser,
    ) -> Option<(usize, &'a str)> {
        let mut first_allow = None;
        let mut first_deny = None;

        for (index, pattern) in self.applying(request, user) {
            let rule = &self.rules[index];
            match rule.kind() {
                RuleType::Allow if rule.is_token_exempt() => {
                    trace!("Matched token-exempt allow rule {}: {}", index, pattern);
                    return Some((index, pattern));
                }
                RuleType::Allow => {
                    first_allow.get_or_insert((index, pattern));
                }
                RuleType::Deny => {
                    first_deny.get_or_insert((index, pattern));
                }
            }
        }

        first_allow.or(first_deny)
    }

    fn applying<'a>(
        &'a self,
        request: &'a AccessRequest,
        user: &'a NormalizedUser,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.rules.iter().enumerate().filter_map(move |(index, rule)| {
            let pattern = rule.applies(&request.url, &user.roles, user.status.as_deref())?;
            trace!("Rule {} ({}) applies via pattern '{}'", index, rule.kind(), pattern);
            Some((index, pattern))
        })
    }
}

/// Outcome of an applying rule
fn apply(kind: RuleType, token_exempt: bool, valid: bool) -> Verdict {
    match kind {
        RuleType::Deny => Verdict::Denied(Denial::FORBIDDEN),
        RuleType::Allow if token_exempt || valid => Verdict::Granted,
        RuleType::Allow => Verdict::Denied(Denial::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::types::User;

    fn request(url: &str, roles: &[&str], valid: bool) -> AccessRequest {
        AccessRequest::new(url, User::new(roles.iter().copied())).with_valid_token(valid)
    }

    #[test]
    fn test_apply_table() {
        assert_eq!(apply(RuleType::Deny, false, true), Verdict::Denied(Denial::FORBIDDEN));
        assert_eq!(apply(RuleType::Deny, true, true), Verdict::Denied(Denial::FORBIDDEN));
        assert_eq!(apply(RuleType::Allow, false, true), Verdict::Granted);
        assert_eq!(apply(RuleType::Allow, true, false), Verdict::Granted);
        assert_eq!(
            apply(RuleType::Allow, false, false),
            Verdict::Denied(Denial::UNAUTHORIZED)
        );
    }

    #[test]
    fn test_empty_rule_set_denies() {
        let evaluator = RuleEvaluator::from_rules(&[]).unwrap();
        assert!(evaluator.is_empty());
        let evaluation = evaluator.explain(&request("/", &["admin"], true));
        assert_eq!(evaluation.verdict, Verdict::Denied(Denial::FORBIDDEN));
        assert_eq!(evaluation.rule, None);
    }

    #[test]
    fn test_default_allow_still_checks_token() {
        let evaluator = RuleEvaluator::new(&AccessControlConfig {
            default_policy: DefaultPolicy::Allow,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(evaluator.evaluate(&request("/x", &[], true)), Verdict::Granted);
        assert_eq!(
            evaluator.evaluate(&request("/x", &[], false)),
            Verdict::Denied(Denial::UNAUTHORIZED)
        );
    }

    #[test]
    fn test_explain_reports_rule_and_pattern() {
        let evaluator = RuleEvaluator::from_rules(&[
            RuleConfig::deny(["/admin/(.*)"]),
            RuleConfig::allow(["/", "/(.*)"]),
        ])
        .unwrap();

        let evaluation = evaluator.explain(&request("/docs", &[], true));
        assert_eq!(evaluation.verdict, Verdict::Granted);
        assert_eq!(
            evaluation.rule,
            Some(MatchedRule {
                index: 1,
                kind: RuleType::Allow,
                pattern: "/(.*)".to_string(),
                token_exempt: false,
            })
        );

        let evaluation = evaluator.explain(&request("/admin/users", &[], true));
        assert_eq!(evaluation.rule.map(|r| r.index), Some(0));
    }

    #[test]
    fn test_allow_overrides_prefers_token_exempt_rule() {
        let evaluator = RuleEvaluator::new(&AccessControlConfig {
            mode: EvaluationMode::AllowOverrides,
            rules: vec![
                RuleConfig::allow(["/(.*)"]),
                RuleConfig::deny(["/(.*)"]),
                RuleConfig::allow(["/(.*)/ping"]).exempt_from_token(),
            ],
            ..Default::default()
        })
        .unwrap();

        let evaluation = evaluator.explain(&request("/a/ping", &[], false));
        assert_eq!(evaluation.verdict, Verdict::Granted);
        assert_eq!(evaluation.rule.map(|r| r.index), Some(2));

        let evaluation = evaluator.explain(&request("/a/other", &[], false));
        assert_eq!(evaluation.verdict, Verdict::Denied(Denial::UNAUTHORIZED));
        assert_eq!(evaluation.rule.map(|r| r.index), Some(0));
    }

    #[test]
    fn test_require() {
        let evaluator = RuleEvaluator::from_rules(&[RuleConfig::allow(["/(.*)"])]).unwrap();
        assert!(evaluator.require(&request("/x", &[], true)).is_ok());
        assert_eq!(
            evaluator.require(&request("/x", &[], false)),
            Err(Denial::UNAUTHORIZED)
        );
    }

    #[test]
    fn test_evaluator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleEvaluator>();
    }
}
