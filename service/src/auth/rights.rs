//! [`Right`] tokens and the [`RightsSet`] they are granted through.

use std::{collections::BTreeMap, fmt, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Wildcard segment of a [`Right`], matching any suffix.
const WILDCARD: &str = "*";

/// Dot-segmented capability token (e.g. `channels.modify`, `users.*`).
///
/// Tokens are case-sensitive. Every segment is a non-empty run of
/// `[a-zA-Z0-9_]`; the final segment may instead be the `*` wildcard, which
/// makes the token match any suffix under its prefix. A bare `*` matches
/// everything.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Right(String);

impl Right {
    /// Creates a new [`Right`] if the given `token` is valid.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        Self::check(&token).then_some(Self(token))
    }

    /// Checks whether the given `token` is a valid [`Right`].
    fn check(token: impl AsRef<str>) -> bool {
        let mut segments = token.as_ref().split('.').peekable();
        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            if segment == WILDCARD {
                if !last {
                    return false;
                }
            } else if segment.is_empty()
                || !segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return false;
            }
        }
        true
    }

    /// Returns the segments of this [`Right`], in order.
    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl AsRef<str> for Right {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Right {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Right`")
    }
}

impl<'de> Deserialize<'de> for Right {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let raw = String::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| D::Error::custom("invalid `Right`"))
    }
}

/// Owned, mutable set of granted [`Right`]s.
///
/// Membership is queried through [`RightsSet::has()`], which honors
/// wildcard grants: a stored `users.*` grants any token under `users`, and
/// a bare `*` grants everything. Lookup walks a segmented prefix tree, so
/// its cost is proportional to the queried token's depth rather than to the
/// set size.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RightsSet {
    /// Root [`Node`] of the prefix tree.
    root: Node,
}

/// Single segment node of the [`RightsSet`] prefix tree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Node {
    /// Child nodes, keyed by their segment.
    children: BTreeMap<String, Node>,

    /// Indicator whether a granted token ends at this node.
    terminal: bool,

    /// Indicator whether a wildcard grant covers every suffix under this
    /// node.
    wildcard: bool,
}

impl Node {
    /// Indicates whether this [`Node`] carries no grants and no children.
    fn is_void(&self) -> bool {
        !self.terminal && !self.wildcard && self.children.is_empty()
    }
}

impl RightsSet {
    /// Creates a new empty [`RightsSet`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether this [`RightsSet`] holds no grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_void()
    }

    /// Adds the provided [`Right`] to this [`RightsSet`].
    ///
    /// Returns `false` if the exact token was granted already.
    pub fn add(&mut self, right: Right) -> bool {
        let mut node = &mut self.root;
        let mut wildcard = false;
        for segment in right.segments() {
            if segment == WILDCARD {
                wildcard = true;
                break;
            }
            node = node.children.entry(segment.to_owned()).or_default();
        }

        let flag = if wildcard {
            &mut node.wildcard
        } else {
            &mut node.terminal
        };
        let fresh = !*flag;
        *flag = true;
        fresh
    }

    /// Removes the provided [`Right`] from this [`RightsSet`].
    ///
    /// Only the exact token is removed: removing `users.*` does not touch an
    /// explicitly granted `users.view`.
    ///
    /// Returns `false` if the exact token was not granted.
    pub fn remove(&mut self, right: &Right) -> bool {
        let segments =
            right.segments().collect::<Vec<_>>();
        Self::remove_at(&mut self.root, &segments)
    }

    /// Removes the token described by `segments` under the provided
    /// [`Node`], pruning emptied branches on unwind.
    fn remove_at(node: &mut Node, segments: &[&str]) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            let removed = node.terminal;
            node.terminal = false;
            return removed;
        };

        // A wildcard is only valid as the final segment of a token.
        if *head == WILDCARD {
            let removed = node.wildcard;
            node.wildcard = false;
            return removed;
        }

        let Some(child) = node.children.get_mut(*head) else {
            return false;
        };
        let removed = Self::remove_at(child, rest);
        if child.is_void() {
            _ = node.children.remove(*head);
        }
        removed
    }

    /// Indicates whether the provided token is granted by this
    /// [`RightsSet`], either exactly or through a wildcard.
    ///
    /// Matching is case-sensitive and segment-aligned: `users.*` grants
    /// `users.view` but never `userservice.x`.
    #[must_use]
    pub fn has(&self, token: &str) -> bool {
        let mut node = &self.root;
        for segment in token.split('.') {
            if node.wildcard {
                return true;
            }
            match node.children.get(segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// Returns every granted token of this [`RightsSet`], in lexicographic
    /// order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let mut out = Vec::new();
        Self::collect(&self.root, String::new(), &mut out);
        out
    }

    /// Returns every granted [`Right`] of this [`RightsSet`], in
    /// lexicographic order.
    #[must_use]
    pub fn rights(&self) -> Vec<Right> {
        self.tokens().into_iter().map(Right).collect()
    }

    /// Collects granted tokens under the provided [`Node`] into `out`.
    fn collect(node: &Node, prefix: String, out: &mut Vec<String>) {
        if node.terminal {
            out.push(prefix.clone());
        }
        if node.wildcard {
            if prefix.is_empty() {
                out.push(WILDCARD.to_owned());
            } else {
                out.push(format!("{prefix}.{WILDCARD}"));
            }
        }
        for (segment, child) in &node.children {
            let child_prefix = if prefix.is_empty() {
                segment.clone()
            } else {
                format!("{prefix}.{segment}")
            };
            Self::collect(child, child_prefix, out);
        }
    }
}

impl Extend<Right> for RightsSet {
    fn extend<I: IntoIterator<Item = Right>>(&mut self, iter: I) {
        for right in iter {
            _ = self.add(right);
        }
    }
}

impl fmt::Display for RightsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tokens().join(", "))
    }
}

#[cfg(test)]
mod spec {
    use super::{Right, RightsSet};

    fn right(token: &str) -> Right {
        Right::new(token).unwrap()
    }

    #[test]
    fn token_format() {
        assert!(Right::new("channels.modify").is_some());
        assert!(Right::new("users.*").is_some());
        assert!(Right::new("*").is_some());
        assert!(Right::new("a_b.c1").is_some());

        assert!(Right::new("").is_none());
        assert!(Right::new(".").is_none());
        assert!(Right::new("users.").is_none());
        assert!(Right::new(".users").is_none());
        assert!(Right::new("users.*.view").is_none());
        assert!(Right::new("users view").is_none());
        assert!(Right::new("users.vi*w").is_none());
    }

    #[test]
    fn exact_match_is_reflexive() {
        let mut rights = RightsSet::new();
        assert!(rights.add(right("a.b")));
        assert!(!rights.add(right("a.b")));

        assert!(rights.has("a.b"));
        assert!(!rights.has("a"));
        assert!(!rights.has("a.b.c"));
    }

    #[test]
    fn wildcard_matches_any_suffix() {
        let mut rights = RightsSet::new();
        _ = rights.add(right("a.*"));

        assert!(rights.has("a.b"));
        assert!(rights.has("a.b.c"));
        assert!(!rights.has("ab.c"));
        assert!(!rights.has("a"));
    }

    #[test]
    fn bare_wildcard_matches_everything() {
        let mut rights = RightsSet::new();
        _ = rights.add(right("*"));

        assert!(rights.has("a"));
        assert!(rights.has("users.remove"));
    }

    #[test]
    fn matching_is_segment_aligned() {
        let mut rights = RightsSet::new();
        _ = rights.add(right("users.*"));

        assert!(rights.has("users.view"));
        assert!(!rights.has("userservice.x"));
    }

    #[test]
    fn removal_is_exact() {
        let mut rights = RightsSet::new();
        _ = rights.add(right("users.*"));
        _ = rights.add(right("users.view"));

        assert!(rights.remove(&right("users.*")));
        assert!(!rights.remove(&right("users.*")));
        assert!(rights.has("users.view"));
        assert!(!rights.has("users.remove"));

        assert!(rights.remove(&right("users.view")));
        assert!(rights.is_empty());
    }

    #[test]
    fn tokens_round_trip() {
        let mut rights = RightsSet::new();
        _ = rights.add(right("channels.modify"));
        _ = rights.add(right("users.*"));
        _ = rights.add(right("admin"));

        assert_eq!(
            rights.tokens(),
            ["admin", "channels.modify", "users.*"],
        );
    }
}
