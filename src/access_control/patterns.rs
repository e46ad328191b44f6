//! Route pattern matching
//!
//! Compiles the `route` list of a rule into regexes that are tested against
//! the raw request path.

use crate::config::RouteMatching;
use crate::error::ConfigError;
use regex::Regex;

/// Compiled route matcher
#[derive(Debug)]
pub struct RouteMatcher {
    patterns: Vec<CompiledPattern>,
}

#[derive(Debug)]
struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl RouteMatcher {
    /// Create a new matcher from a list of regex patterns
    ///
    /// With [`RouteMatching::Full`] every pattern is anchored at both ends, so
    /// `/` matches only the root path.
    pub fn new(patterns: &[String], matching: RouteMatching) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let regex = compile(pattern, matching).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            compiled.push(CompiledPattern {
                source: pattern.clone(),
                regex,
            });
        }

        Ok(Self { patterns: compiled })
    }

    /// Create an empty matcher (matches nothing)
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Check if a path matches any pattern
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.regex.is_match(path))
    }

    /// Check if a path matches any pattern, returning the first matching pattern
    pub fn find_match(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(path))
            .map(|p| p.source.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compile a single pattern under the given matching mode
pub(crate) fn compile(pattern: &str, matching: RouteMatching) -> Result<Regex, regex::Error> {
    match matching {
        RouteMatching::Full => Regex::new(&format!("^(?:{})$", pattern)),
        RouteMatching::Partial => Regex::new(pattern),
    }
}
