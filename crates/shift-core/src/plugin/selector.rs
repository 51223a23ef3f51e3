//! Label selectors for choosing plugins
//!
//! Comma-separated requirements, all of which must hold:
//!
//! ```text
//! target=kubernetes        equality (also `==`)
//! stage!=experimental      inequality, true when the key is absent
//! gpu                      key present
//! !legacy                  key absent
//! tier in (web, api)       value in set
//! tier notin (batch)       value not in set, true when the key is absent
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

const KEY: &str = r"[A-Za-z0-9]([A-Za-z0-9_./-]*[A-Za-z0-9])?";
const VALUE: &str = r"[A-Za-z0-9_./-]*";

static SET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<key>{KEY})\s+(?P<op>in|notin)\s*\((?P<values>[^()]*)\)$")).unwrap()
});

static COMPARE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<key>{KEY})\s*(?P<op>==|=|!=)\s*(?P<value>{VALUE})$")).unwrap()
});

static EXISTS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?P<neg>!?)\s*(?P<key>{KEY})$")).unwrap());

static VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{VALUE}$")).unwrap());

/// One selector clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
    In(String, BTreeSet<String>),
    NotIn(String, BTreeSet<String>),
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals(k, v) => labels.get(k) == Some(v),
            Self::NotEquals(k, v) => labels.get(k) != Some(v),
            Self::Exists(k) => labels.contains_key(k),
            Self::NotExists(k) => !labels.contains_key(k),
            Self::In(k, set) => labels.get(k).is_some_and(|v| set.contains(v)),
            Self::NotIn(k, set) => labels.get(k).is_none_or(|v| !set.contains(v)),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
        match self {
            Self::Equals(k, v) => write!(f, "{k}={v}"),
            Self::NotEquals(k, v) => write!(f, "{k}!={v}"),
            Self::Exists(k) => write!(f, "{k}"),
            Self::NotExists(k) => write!(f, "!{k}"),
            Self::In(k, set) => write!(f, "{k} in ({})", join(set)),
            Self::NotIn(k, set) => write!(f, "{k} notin ({})", join(set)),
        }
    }
}

/// A conjunction of [`Requirement`]s. The empty selector matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Selector matching everything.
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn parse(expr: &str) -> crate::Result<Self> {
        let mut requirements = Vec::new();
        for clause in split_clauses(expr) {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            requirements.push(parse_requirement(clause).map_err(|message| Error::Selector {
                expr: expr.to_string(),
                message,
            })?);
        }
        Ok(Self { requirements })
    }

    /// Add a requirement to the conjunction.
    pub fn and(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl FromStr for LabelSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

/// Split on commas outside parentheses.
fn split_clauses(expr: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                clauses.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&expr[start..]);
    clauses
}

fn parse_requirement(clause: &str) -> Result<Requirement, String> {
    if let Some(caps) = SET_PATTERN.captures(clause) {
        let key = caps["key"].to_string();
        let mut values = BTreeSet::new();
        for value in caps["values"].split(',').map(str::trim) {
            if value.is_empty() || !VALUE_PATTERN.is_match(value) {
                return Err(format!("invalid value '{value}' in '{clause}'"));
            }
            values.insert(value.to_string());
        }
        return Ok(match &caps["op"] {
            "in" => Requirement::In(key, values),
            _ => Requirement::NotIn(key, values),
        });
    }

    if let Some(caps) = COMPARE_PATTERN.captures(clause) {
        let (key, value) = (caps["key"].to_string(), caps["value"].to_string());
        return Ok(match &caps["op"] {
            "!=" => Requirement::NotEquals(key, value),
            _ => Requirement::Equals(key, value),
        });
    }

    if let Some(caps) = EXISTS_PATTERN.captures(clause) {
        let key = caps["key"].to_string();
        return Ok(if caps["neg"].is_empty() {
            Requirement::Exists(key)
        } else {
            Requirement::NotExists(key)
        });
    }

    Err(format!("cannot parse requirement '{clause}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[rstest]
    #[case("", true)]
    #[case("target=kubernetes", true)]
    #[case("target==kubernetes", true)]
    #[case("target=knative", false)]
    #[case("target!=knative", true)]
    #[case("stage!=experimental", true)]
    #[case("tier", true)]
    #[case("gpu", false)]
    #[case("!gpu", true)]
    #[case("!tier", false)]
    #[case("tier in (web, api)", true)]
    #[case("tier in (batch)", false)]
    #[case("tier notin (batch)", true)]
    #[case("missing notin (x)", true)]
    #[case("target=kubernetes, tier in (web,api), !gpu", true)]
    #[case("target=kubernetes,gpu", false)]
    fn selector_matches(#[case] expr: &str, #[case] expected: bool) {
        let l = labels(&[("target", "kubernetes"), ("tier", "web")]);
        let selector = LabelSelector::parse(expr).unwrap();
        assert_eq!(selector.matches(&l), expected, "{expr}");
    }

    #[rstest]
    #[case("=x")]
    #[case("tier in ()")]
    #[case("tier in (a b)")]
    #[case("a b")]
    fn rejects_malformed(#[case] expr: &str) {
        let result = LabelSelector::parse(expr);
        assert!(matches!(result, Err(Error::Selector { .. })), "{expr}");
    }

    #[test]
    fn empty_value_compares_against_empty_label() {
        let selector = LabelSelector::parse("target=").unwrap();
        assert!(selector.matches(&labels(&[("target", "")])));
        assert!(!selector.matches(&labels(&[("target", "x")])));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let selector: LabelSelector = "tier notin (b,a), target==k8s, !gpu".parse().unwrap();
        assert_eq!(selector.to_string(), "tier notin (a,b),target=k8s,!gpu");
        assert_eq!(LabelSelector::parse(&selector.to_string()).unwrap(), selector);
    }
}
