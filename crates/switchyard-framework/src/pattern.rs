//! Method + full-path pattern matching.
//!
//! A [`Pattern`] pairs a method name with a regular expression that must match
//! the *whole* request path. A prefix or substring match does not count:
//! `/greet` does not accept `/greeting` or `/a/greet`.
//!
//! A successful match produces [`Captures`], an owned snapshot of the groups
//! that handlers can take as a parameter.
//!
//! ```rust
//! use switchyard_framework::Pattern;
//!
//! let pattern = Pattern::new("GET", "/(?<path>.+)").unwrap();
//! let captures = pattern.captures("GET", "/apple").unwrap();
//!
//! assert_eq!(captures.name("path"), Some("apple"));
//! assert!(!pattern.accepts("POST", "/apple"));
//! assert!(!pattern.accepts("GET", "/"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouteError;

/// A compiled (method, path pattern) pair.
///
/// Matching is a pure function of the method and path.
#[derive(Debug, Clone)]
pub struct Pattern {
    method: String,
    source: String,
    regex: Regex,
    names: Arc<HashMap<String, usize>>,
}

impl Pattern {
    /// Compiles a pattern.
    ///
    /// The source is anchored at both ends before compilation, so it always
    /// has to match the entire path.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if the source is not a valid
    /// regular expression on its own.
    pub fn new(method: impl Into<String>, source: impl Into<String>) -> Result<Self, RouteError> {
        let method = method.into();
        let source = source.into();

        let invalid = |e| RouteError::InvalidPattern {
            method: method.clone(),
            pattern: source.clone(),
            source: e,
        };

        // An unbalanced source such as `/a)|(/b` only compiles once wrapped,
        // and would then escape the anchors.
        Regex::new(&source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;

        let names = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|n| (n.to_string(), i)))
            .collect();

        Ok(Self {
            method,
            source,
            regex,
            names: Arc::new(names),
        })
    }

    /// The method this pattern accepts.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The pattern source as declared (before anchoring).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests whether this pattern accepts the given method and path.
    ///
    /// The method comparison is exact; no case folding is applied.
    pub fn accepts(&self, method: &str, path: &str) -> bool {
        self.method == method && self.regex.is_match(path)
    }

    /// Matches the given method and path, returning the captured groups.
    pub fn captures(&self, method: &str, path: &str) -> Option<Captures> {
        if self.method != method {
            return None;
        }

        let caps = self.regex.captures(path)?;
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();

        Some(Captures {
            groups,
            names: Arc::clone(&self.names),
        })
    }
}

/// The groups captured by a successful [`Pattern`] match.
///
/// Group 0 is always the whole path. Optional groups that did not take part in
/// the match are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
    names: Arc<HashMap<String, usize>>,
}

impl Captures {
    /// The whole matched path.
    pub fn as_str(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Returns a group by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Returns a named group.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names.get(name).and_then(|&i| self.get(i))
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always `false`: group 0 is present in every match.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over the named groups that took part in the match.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .filter_map(|(name, &i)| self.get(i).map(|value| (name.as_str(), value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_required() {
        let pattern = Pattern::new("GET", "/greet").unwrap();
        assert!(pattern.accepts("GET", "/greet"));
        assert!(!pattern.accepts("GET", "/greeting"));
        assert!(!pattern.accepts("GET", "/a/greet"));
        assert!(!pattern.accepts("GET", "/greet/"));
    }

    #[test]
    fn test_alternation_is_anchored() {
        let pattern = Pattern::new("GET", "/a|/b").unwrap();
        assert!(pattern.accepts("GET", "/a"));
        assert!(pattern.accepts("GET", "/b"));
        assert!(!pattern.accepts("GET", "/a/x"));
        assert!(!pattern.accepts("GET", "/x/b"));
    }

    #[test]
    fn test_method_is_case_sensitive() {
        let pattern = Pattern::new("GET", "/").unwrap();
        assert!(pattern.accepts("GET", "/"));
        assert!(!pattern.accepts("get", "/"));
        assert!(!pattern.accepts("POST", "/"));
        assert!(pattern.captures("get", "/").is_none());
    }

    #[test]
    fn test_named_and_numbered_groups() {
        let pattern = Pattern::new("GET", r"/users/(?<id>\d+)/posts/(\d+)").unwrap();
        let caps = pattern.captures("GET", "/users/42/posts/7").unwrap();

        assert_eq!(caps.as_str(), "/users/42/posts/7");
        assert_eq!(caps.name("id"), Some("42"));
        assert_eq!(caps.get(1), Some("42"));
        assert_eq!(caps.get(2), Some("7"));
        assert_eq!(caps.len(), 3);
        assert_eq!(caps.name("missing"), None);
        assert_eq!(caps.named().collect::<Vec<_>>(), vec![("id", "42")]);
    }

    #[test]
    fn test_optional_group_absent() {
        let pattern = Pattern::new("GET", r"/files(?<ext>\.json)?").unwrap();
        let caps = pattern.captures("GET", "/files").unwrap();
        assert_eq!(caps.name("ext"), None);
        assert_eq!(caps.named().count(), 0);
    }

    #[test]
    fn test_python_style_named_group() {
        let pattern = Pattern::new("GET", "/(?P<path>.+)").unwrap();
        let caps = pattern.captures("GET", "/apple/orange").unwrap();
        assert_eq!(caps.name("path"), Some("apple/orange"));
    }

    #[test]
    fn test_invalid_pattern_fails() {
        let err = Pattern::new("GET", "/(unclosed").unwrap_err();
        match err {
            RouteError::InvalidPattern {
                method, pattern, ..
            } => {
                assert_eq!(method, "GET");
                assert_eq!(pattern, "/(unclosed");
            }
        }
    }

    #[test]
    fn test_unbalanced_pattern_rejected() {
        let err = Pattern::new("GET", "/a)|(/b").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == "/a)|(/b"));

        assert!(Pattern::new("GET", "(/a").is_err());
        assert!(Pattern::new("GET", "/a)").is_err());
    }
}
