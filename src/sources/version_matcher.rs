// Version parsing and constraint matching over loosely structured plugin versions

use crate::constants;
use crate::error::ResolveError;
use semver::{BuildMetadata, Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Parse a plugin version string.
///
/// Accepts a leading `v`, then tries strict `major.minor.patch[-pre][+build]`.
/// Failing that, the leading `major.minor[.patch]` digits are used along with
/// a `-pre`/`+build` suffix directly after them, so "1.20" becomes 1.20.0,
/// "2.0-beta" becomes 2.0.0-beta and "5.1.0.2-hotfix" becomes 5.1.0.
pub fn parse_version(raw: &str) -> Result<Version, ResolveError> {
    let trimmed = raw.trim();
    let clean = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if let Ok(version) = Version::parse(clean) {
        return Ok(version);
    }

    numeric_prefix(clean).ok_or_else(|| ResolveError::Unparseable {
        version: raw.to_string(),
    })
}

/// Longest leading `major.minor[.patch]` plus an adjacent suffix
fn numeric_prefix(s: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut count = 0;
    let mut rest = s;

    while count < 3 {
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            break;
        }
        parts[count] = rest[..len].parse().ok()?;
        count += 1;
        rest = &rest[len..];

        match rest.strip_prefix('.') {
            Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
            _ => break,
        }
    }

    if count < 2 {
        return None;
    }

    let mut version = Version::new(parts[0], parts[1], parts[2]);
    if let Some(suffix) = rest.strip_prefix('-') {
        let pre = identifiers(suffix);
        match Prerelease::new(pre) {
            Ok(parsed) if !parsed.is_empty() => {
                version.pre = parsed;
                rest = &suffix[pre.len()..];
            }
            _ => return Some(version),
        }
    }
    if let Some(suffix) = rest.strip_prefix('+')
        && let Ok(build) = BuildMetadata::new(identifiers(suffix))
    {
        version.build = build;
    }
    Some(version)
}

/// Leading run of dot-separated semver identifier characters
fn identifiers(s: &str) -> &str {
    let len = s
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'.')
        .count();
    s[..len].trim_end_matches('.')
}

/// Semver precedence: numeric fields, then prerelease (a prerelease sorts
/// before its release). Build metadata is ignored.
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Parse a constraint string. `Ok(None)` means "no constraint".
///
/// A bare version such as "5.0.0" or "1.20" is an exact match; anything
/// else goes through the range grammar.
pub fn parse_constraint(raw: &str) -> Result<Option<Constraint>, ResolveError> {
    let trimmed = raw.trim();
    if is_unconstrained(trimmed) {
        return Ok(None);
    }

    if is_bare_version(trimmed) {
        return Constraint::parse_expr(raw, &format!("={}", trimmed)).map(Some);
    }

    Constraint::parse_expr(raw, trimmed).map(Some)
}

/// Empty and `latest` both mean "take the newest as supplied"
pub fn is_unconstrained(constraint: &str) -> bool {
    let trimmed = constraint.trim();
    trimmed.is_empty() || trimmed == constants::LATEST
}

fn is_bare_version(s: &str) -> bool {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let starts_numeric = digits > 0
        && s[digits..].starts_with('.')
        && s[digits + 1..].starts_with(|c: char| c.is_ascii_digit());

    starts_numeric && !s.contains(['=', '<', '>', '~', '^', ',', '|', ' ', '-'])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Tilde,
    Caret,
}

impl Op {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "" | "=" | "==" => Op::Eq,
            "!=" => Op::Ne,
            ">" => Op::Gt,
            ">=" | "=>" => Op::Ge,
            "<" => Op::Lt,
            "<=" | "=<" => Op::Le,
            "~" | "~>" => Op::Tilde,
            "^" => Op::Caret,
            _ => return None,
        })
    }
}

/// Version as written in a constraint; trailing components may be missing
/// or wildcards.
#[derive(Debug)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(token: &str) -> Result<Self, String> {
        let token = token.strip_prefix(['v', 'V']).unwrap_or(token);
        let core_pre = token.split_once('+').map_or(token, |(head, _)| head);
        let (core, pre) = match core_pre.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (core_pre, None),
        };

        let pre = match pre {
            Some(p) => Prerelease::new(p).map_err(|e| format!("bad prerelease '{}': {}", p, e))?,
            None => Prerelease::EMPTY,
        };

        let fields: Vec<&str> = core.split('.').collect();
        if fields.len() > 3 {
            return Err(format!("too many version components in '{}'", token));
        }

        let mut numbers = [None; 3];
        let mut wildcard = false;
        for (slot, field) in numbers.iter_mut().zip(&fields) {
            match *field {
                "x" | "X" | "*" => wildcard = true,
                "" => return Err(format!("empty version component in '{}'", token)),
                digits if !wildcard => {
                    *slot = Some(
                        digits
                            .parse::<u64>()
                            .map_err(|_| format!("'{}' is not a version number", digits))?,
                    );
                }
                // anything after a wildcard is ignored ("1.x.3" is "1.x")
                _ => {}
            }
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    /// Number of leading components given as numbers
    fn specified(&self) -> usize {
        match (self.major, self.minor, self.patch) {
            (None, _, _) => 0,
            (Some(_), None, _) => 1,
            (Some(_), Some(_), None) => 2,
            (Some(_), Some(_), Some(_)) => 3,
        }
    }

    /// Lowest version the partial can stand for
    fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: semver::BuildMetadata::EMPTY,
        }
    }

    /// First version past every version sharing the given components
    /// (e.g. "1.2" -> 1.3.0-0), or `None` when unbounded.
    fn past_prefix(&self) -> Option<Version> {
        match (self.major, self.minor) {
            (Some(major), None) => Some(lowest(major.saturating_add(1), 0, 0)),
            (Some(major), Some(minor)) => Some(lowest(major, minor.saturating_add(1), 0)),
            _ => None,
        }
    }
}

/// `major.minor.patch-0`, the smallest version with those numbers
fn lowest(major: u64, minor: u64, patch: u64) -> Version {
    let mut version = Version::new(major, minor, patch);
    version.pre = Prerelease::new("0").unwrap_or(Prerelease::EMPTY);
    version
}

#[derive(Debug, Clone)]
struct Bound {
    version: Version,
    inclusive: bool,
}

impl Bound {
    fn inclusive(version: Version) -> Option<Self> {
        Some(Self {
            version,
            inclusive: true,
        })
    }

    fn exclusive(version: Version) -> Option<Self> {
        Some(Self {
            version,
            inclusive: false,
        })
    }
}

/// One comparator compiled to an interval (optionally negated)
#[derive(Debug, Clone)]
struct Comparator {
    lower: Option<Bound>,
    upper: Option<Bound>,
    negate: bool,
    /// Bound was written with a prerelease tag, which lets prerelease
    /// candidates through the whole conjunction.
    prerelease: bool,
}

impl Comparator {
    fn any() -> Self {
        Self {
            lower: None,
            upper: None,
            negate: false,
            prerelease: false,
        }
    }

    fn none() -> Self {
        Self {
            negate: true,
            ..Self::any()
        }
    }

    fn between(lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self {
            lower,
            upper,
            ..Self::any()
        }
    }

    fn compile(op: Op, partial: &Partial) -> Self {
        let n = partial.specified();
        let floor = partial.floor();

        let mut comparator = match op {
            Op::Eq | Op::Ne => {
                let mut eq = match n {
                    0 => Self::any(),
                    3 => Self::between(Bound::inclusive(floor.clone()), Bound::inclusive(floor)),
                    _ => Self::between(
                        Bound::inclusive(floor),
                        partial.past_prefix().and_then(Bound::exclusive),
                    ),
                };
                if op == Op::Ne {
                    eq.negate = !eq.negate;
                }
                eq
            }
            Op::Ge => Self::between(Bound::inclusive(floor), None),
            Op::Gt => match n {
                0 => Self::none(),
                3 => Self::between(Bound::exclusive(floor), None),
                _ => Self::between(partial.past_prefix().and_then(Bound::inclusive), None),
            },
            Op::Lt => match n {
                0 => Self::none(),
                _ => Self::between(None, Bound::exclusive(floor)),
            },
            Op::Le => match n {
                0 => Self::any(),
                3 => Self::between(None, Bound::inclusive(floor)),
                _ => Self::between(None, partial.past_prefix().and_then(Bound::exclusive)),
            },
            Op::Tilde => {
                let upper = match (partial.major, partial.minor) {
                    (Some(major), Some(minor)) => Some(lowest(major, minor.saturating_add(1), 0)),
                    (Some(major), None) => Some(lowest(major.saturating_add(1), 0, 0)),
                    _ => None,
                };
                Self::between(Bound::inclusive(floor), upper.and_then(Bound::exclusive))
            }
            Op::Caret => {
                // first non-zero component may not change
                let upper = match (partial.major, partial.minor, partial.patch) {
                    (None, _, _) => None,
                    (Some(major), None, _) => Some(lowest(major.saturating_add(1), 0, 0)),
                    (Some(major), Some(minor), patch) => Some(if major > 0 {
                        lowest(major.saturating_add(1), 0, 0)
                    } else {
                        match patch {
                            Some(patch) if minor == 0 => lowest(0, 0, patch.saturating_add(1)),
                            _ => lowest(0, minor.saturating_add(1), 0),
                        }
                    }),
                };
                Self::between(Bound::inclusive(floor), upper.and_then(Bound::exclusive))
            }
        };

        comparator.prerelease = !partial.pre.is_empty();
        comparator
    }

    fn contains(&self, version: &Version) -> bool {
        let above = self.lower.as_ref().is_none_or(|b| {
            match cmp_precedence(version, &b.version) {
                Ordering::Greater => true,
                Ordering::Equal => b.inclusive,
                Ordering::Less => false,
            }
        });
        let below = self.upper.as_ref().is_none_or(|b| {
            match cmp_precedence(version, &b.version) {
                Ordering::Less => true,
                Ordering::Equal => b.inclusive,
                Ordering::Greater => false,
            }
        });

        (above && below) != self.negate
    }
}

/// A parsed constraint: a disjunction (`|` or `||`) of conjunctions
/// (`,` or whitespace separated comparators).
///
/// Prerelease candidates only match a conjunction in which some bound
/// carries a prerelease tag: `~3.4` rejects 3.4.0-SNAPSHOT, `~3.4.0-0`
/// accepts it.
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl Constraint {
    fn parse_expr(raw: &str, expr: &str) -> Result<Self, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidConstraint {
            constraint: raw.to_string(),
            reason,
        };

        let normalized = expr.replace("||", "|");
        let mut alternatives = Vec::new();

        for alternative in normalized.split('|') {
            let mut comparators = Vec::new();
            for group in alternative.split(',') {
                let group = group.trim();
                if group.is_empty() {
                    return Err(invalid("empty range expression".into()));
                }
                parse_group(group, &mut comparators).map_err(invalid)?;
            }
            alternatives.push(comparators);
        }

        Ok(Self {
            raw: raw.trim().to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|comparators| {
            let admitted = version.pre.is_empty() || comparators.iter().any(|c| c.prerelease);
            admitted && comparators.iter().all(|c| c.contains(version))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Parse one comma group: comparators separated by whitespace, each an
/// optional operator followed by a version (spaces allowed in between).
fn parse_group(group: &str, out: &mut Vec<Comparator>) -> Result<(), String> {
    let is_op_char = |c: char| matches!(c, '=' | '<' | '>' | '!' | '~' | '^');
    let mut rest = group;

    while !rest.is_empty() {
        let op_len = rest.find(|c: char| !is_op_char(c)).unwrap_or(rest.len());
        let op_text = &rest[..op_len];
        let op = Op::parse(op_text).ok_or_else(|| format!("unknown operator '{}'", op_text))?;

        rest = rest[op_len..].trim_start();
        let version_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if version_len == 0 {
            return Err(format!("operator '{}' is missing a version", op_text));
        }

        let partial = Partial::parse(&rest[..version_len])?;
        out.push(Comparator::compile(op, &partial));
        rest = rest[version_len..].trim_start();
    }

    Ok(())
}

impl FromStr for Constraint {
    type Err = ResolveError;

    /// Parses a non-empty constraint; "latest" and "" are rejected here,
    /// use [`parse_constraint`] when those are acceptable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_constraint(s)?.ok_or_else(|| ResolveError::InvalidConstraint {
            constraint: s.to_string(),
            reason: "no constraint given".into(),
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    fn matches(constraint: &str, version: &str) -> bool {
        parse_constraint(constraint)
            .unwrap()
            .expect("constraint expected")
            .matches(&v(version))
    }

    #[test]
    fn test_parse_version_strict_and_prefixed() {
        assert_eq!(v("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v("v2.0.0"), Version::new(2, 0, 0));
        assert_eq!(v("5.0.4-SNAPSHOT").pre.as_str(), "SNAPSHOT");
        assert_eq!(v("1.20.1-R0.1-SNAPSHOT").pre.as_str(), "R0.1-SNAPSHOT");
    }

    #[test]
    fn test_parse_version_falls_back_to_numeric_prefix() {
        assert_eq!(v("1.20"), Version::new(1, 20, 0));
        assert_eq!(v("5.1.0.2-hotfix"), Version::new(5, 1, 0));
        assert_eq!(v("2.7.1b"), Version::new(2, 7, 1));
    }

    #[test]
    fn test_parse_version_keeps_loose_prerelease() {
        let beta = v("2.0-beta");
        assert_eq!((beta.major, beta.minor, beta.patch), (2, 0, 0));
        assert_eq!(beta.pre.as_str(), "beta");

        let snapshot = v("3.4.0-SNAPSHOT (build 12)");
        assert_eq!(snapshot.pre.as_str(), "SNAPSHOT");

        let tagged = v("1.21-rc.1+git.abc");
        assert_eq!(tagged.pre.as_str(), "rc.1");
        assert_eq!(tagged.build.as_str(), "git.abc");

        // identifiers with leading zeros are not valid prerelease tags
        assert!(v("1.5-01").pre.is_empty());
        assert!(v("1.5-").pre.is_empty());
    }

    #[test]
    fn test_parse_version_unparseable() {
        for raw in ["not-a-version", "", "7", "release-2"] {
            assert!(
                matches!(parse_version(raw), Err(ResolveError::Unparseable { .. })),
                "{} should be unparseable",
                raw
            );
        }
    }

    #[test]
    fn test_unconstrained_inputs() {
        assert!(parse_constraint("").unwrap().is_none());
        assert!(parse_constraint("  ").unwrap().is_none());
        assert!(parse_constraint("latest").unwrap().is_none());
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(matches("5.0.0", "5.0.0"));
        assert!(!matches("5.0.0", "5.0.1"));
        // a bare major.minor covers its patch releases
        assert!(matches("1.20", "1.20.4"));
        assert!(!matches("1.20", "1.21.0"));
    }

    #[test]
    fn test_comparators() {
        assert!(matches("=5.0.0", "5.0.0"));
        assert!(matches(">5.0.0", "5.0.1"));
        assert!(!matches(">5.0.0", "5.0.0"));
        assert!(matches(">=5.0.0", "5.0.0"));
        assert!(matches("<5.0.0", "4.9.9"));
        assert!(!matches("<5.0.0", "5.0.0"));
        assert!(matches("<=5.0.0", "5.0.0"));
        assert!(matches("!=5.0.0", "5.0.1"));
        assert!(!matches("!=5.0.0", "5.0.0"));
    }

    #[test]
    fn test_partial_comparators() {
        assert!(!matches(">1.2", "1.2.9"));
        assert!(matches(">1.2", "1.3.0"));
        assert!(matches("<=1.2", "1.2.9"));
        assert!(!matches("<=1.2", "1.3.0"));
        assert!(matches(">= 1.2", "1.2.0"));
    }

    #[test]
    fn test_tilde_and_caret() {
        assert!(matches("~3.4", "3.4.9"));
        assert!(!matches("~3.4", "3.5.0"));
        assert!(matches("~3", "3.9.0"));
        assert!(matches("~>3.4.1", "3.4.2"));
        assert!(!matches("~3.4.1", "3.4.0"));

        assert!(matches("^1.2.3", "1.9.0"));
        assert!(!matches("^1.2.3", "2.0.0"));
        assert!(matches("^0.2.3", "0.2.9"));
        assert!(!matches("^0.2.3", "0.3.0"));
        assert!(matches("^0.0.3", "0.0.3"));
        assert!(!matches("^0.0.3", "0.0.4"));
        assert!(!matches("^0", "1.0.0"));
    }

    #[test]
    fn test_conjunction_and_disjunction() {
        assert!(matches(">=1.0, <2.0", "1.5.0"));
        assert!(!matches(">=1.0, <2.0", "2.0.0"));
        assert!(matches(">=1.0 <2.0", "1.0.0"));
        assert!(matches("~1.2 || ~2.4", "2.4.1"));
        assert!(matches("~1.2 | ~2.4", "1.2.7"));
        assert!(!matches("~1.2 | ~2.4", "2.5.0"));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("1.2.x", "1.2.8"));
        assert!(!matches("1.2.x", "1.3.0"));
        assert!(matches("*", "42.0.0"));
    }

    #[test]
    fn test_prerelease_excluded_by_default() {
        assert!(!matches("~3.4", "3.4.0-SNAPSHOT"));
        assert!(!matches(">=5.0.0", "5.1.0-beta"));
    }

    #[test]
    fn test_prerelease_inclusion_marker() {
        assert!(matches("~3.4.0-0", "3.4.0-SNAPSHOT"));
        assert!(matches("~3.4.0-0", "3.4.2-rc1"));
        assert!(matches(">=5.0.0-0", "5.1.0-beta"));
        assert!(matches(">=5.0.0-0, <6", "5.1.0-beta"));
        // prereleases of the next minor sit below the exclusive upper bound
        assert!(!matches("~3.4.0-0", "3.5.0-SNAPSHOT"));
    }

    #[test]
    fn test_invalid_constraints() {
        for raw in [">=", "~=3.4", ">=1.0,", "a.b", "1..2", "<<1", "1.2.3.4.5 ||"] {
            assert!(
                matches!(
                    parse_constraint(raw),
                    Err(ResolveError::InvalidConstraint { .. })
                ),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_constraint_from_str_and_display() {
        let c: Constraint = " ^1.2 ".parse().unwrap();
        assert_eq!(c.to_string(), "^1.2");
        assert!("latest".parse::<Constraint>().is_err());
    }

    #[test]
    fn test_precedence_ignores_build_metadata() {
        assert_eq!(
            cmp_precedence(&v("1.0.0+a"), &v("1.0.0+b")),
            Ordering::Equal
        );
        assert_eq!(
            cmp_precedence(&v("1.0.0-rc1"), &v("1.0.0")),
            Ordering::Less
        );
    }
}
