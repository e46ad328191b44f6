//! Access control module
//!
//! Decides whether a request may proceed, given the request path, the user's
//! roles and status, an ordered list of declarative rules, and whether the
//! caller's token passed verification upstream.
//!
//! ## Rule Model
//!
//! Each rule has a `type` (`allow` or `deny`), a list of `route` regex
//! patterns, and optional constraints:
//!
//! - `role`: the user must hold one of these roles (case-insensitive)
//! - `status`: the user's status must be one of these (case-insensitive)
//! - `token_exempt`: an applying allow rule skips the token check
//!
//! A rule *applies* when its route matches and all its constraints hold.
//! In the default `first_match` mode the first applying rule decides;
//! reordering rules changes outcomes.
//!
//! ## Example Configuration
//!
//! ```toml
//! [access_control]
//! mode = "first_match"
//!
//! [[access_control.rules]]
//! type = "allow"
//! route = ["/(.*)/ping"]
//! token_exempt = true
//!
//! [[access_control.rules]]
//! type = "allow"
//! route = ["/(.*)/graphql", "/(.*)/graphql/(.*)"]
//! role = "user"
//! status = ["approved"]
//!
//! [[access_control.rules]]
//! type = "deny"
//! route = ["/", "/(.*)"]
//! role = ["user"]
//! ```

pub mod evaluator;
pub mod patterns;
pub mod rules;
pub mod types;

pub use evaluator::{Evaluation, MatchedRule, RuleEvaluator};
pub use patterns::RouteMatcher;
pub use rules::CompiledRule;
pub use types::{AccessRequest, Denial, RuleType, User, Verdict};
