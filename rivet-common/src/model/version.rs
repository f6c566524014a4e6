// Lenient artifact version ordering.
//
// Most published versions parse as semver and compare through the semver
// crate. Anything else falls back to segment-wise comparison: dot/dash
// separated tokens, numeric tokens compare numerically, a bare release
// orders above the same release with a qualifier (1.0 > 1.0-alpha).
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    semver: Option<semver::Version>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Qual(String),
}

impl Version {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            semver: semver::Version::parse(raw).ok(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segments(&self) -> Vec<Segment> {
        self.raw
            .split(['.', '-', '_'])
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<u64>() {
                Ok(n) => Segment::Num(n),
                Err(_) => Segment::Qual(s.to_ascii_lowercase()),
            })
            .collect()
    }
}

impl Segment {
    fn cmp_segment(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Num(a), Segment::Num(b)) => a.cmp(b),
            // A numeric segment (including the implicit trailing zero of a
            // bare release) always outranks a qualifier.
            (Segment::Num(_), Segment::Qual(_)) => Ordering::Greater,
            (Segment::Qual(_), Segment::Num(_)) => Ordering::Less,
            (Segment::Qual(a), Segment::Qual(b)) => a.cmp(b),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (&self.semver, &other.semver) {
            return a.cmp(b).then_with(|| self.raw.cmp(&other.raw));
        }
        let left = self.segments();
        let right = other.segments();
        let len = left.len().max(right.len());
        for i in 0..len {
            let a = left.get(i).cloned().unwrap_or(Segment::Num(0));
            let b = right.get(i).cloned().unwrap_or(Segment::Num(0));
            match a.cmp_segment(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        self.raw.cmp(&other.raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Range query used to answer "which versions come after X".
///
/// The lower bound is always exclusive; the upper bound, when present, is
/// inclusive or exclusive per `upper_inclusive`.
#[derive(Debug, Clone)]
pub struct VersionQuery {
    pub lower_exclusive: Version,
    pub upper: Option<Version>,
    pub upper_inclusive: bool,
}

impl VersionQuery {
    pub fn above(lower_exclusive: Version) -> Self {
        Self {
            lower_exclusive,
            upper: None,
            upper_inclusive: false,
        }
    }

    pub fn bounded(lower_exclusive: Version, upper: Version, upper_inclusive: bool) -> Self {
        Self {
            lower_exclusive,
            upper: Some(upper),
            upper_inclusive,
        }
    }

    pub fn contains(&self, candidate: &Version) -> bool {
        if candidate.cmp(&self.lower_exclusive) != Ordering::Greater {
            return false;
        }
        match &self.upper {
            None => true,
            Some(upper) => match candidate.cmp(upper) {
                Ordering::Less => true,
                Ordering::Equal => self.upper_inclusive,
                Ordering::Greater => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn semver_versions_compare_numerically() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0.0") > v("1.99.99"));
    }

    #[test]
    fn lenient_versions_compare_segment_wise() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.0.1") > v("1.0"));
        assert_eq!(v("1.0").cmp(&v("1.0.0")), std::cmp::Ordering::Less); // raw tie-break
    }

    #[test]
    fn release_outranks_qualifier() {
        assert!(v("1.0") > v("1.0-alpha"));
        assert!(v("1.0-beta") > v("1.0-alpha"));
    }

    #[test]
    fn query_lower_bound_is_exclusive() {
        let query = VersionQuery::above(v("1.0"));
        assert!(!query.contains(&v("1.0")));
        assert!(query.contains(&v("1.0.1")));
    }

    #[test]
    fn query_upper_bound_honors_inclusivity() {
        let inclusive = VersionQuery::bounded(v("1.0"), v("2.0"), true);
        assert!(inclusive.contains(&v("2.0")));
        let exclusive = VersionQuery::bounded(v("1.0"), v("2.0"), false);
        assert!(!exclusive.contains(&v("2.0")));
        assert!(exclusive.contains(&v("1.5")));
    }
}
