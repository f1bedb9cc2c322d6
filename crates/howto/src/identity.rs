//! Guide name normalization and identity.
//!
//! A guide filename like `02_Network-Setup.md` carries an optional numeric
//! prefix used for manual ordering and a sequence of name tokens. Both the
//! filenames and user queries are pushed through [`normalize`] first, so
//! matching is case and word-boundary invariant.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Matches a normalized name carrying a numeric ordering prefix.
static PREFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)_(.*)$").unwrap_or_else(|err| panic!("invalid PREFIXED regex: {err}"))
});

/// Convert a string into the standardized comparison format: every run of
/// whitespace or hyphens becomes a single underscore and all letters are
/// lowercased. Idempotent.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_separator = false;
    for ch in raw.chars() {
        if ch.is_whitespace() || ch == '-' {
            in_separator = true;
        } else {
            if in_separator {
                out.push('_');
                in_separator = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    if in_separator {
        out.push('_');
    }
    out
}

/// Strip the accepted guide extensions (`.md`, `.md.jinja`) from a filename.
/// Unrecognized extensions are left in place.
#[must_use]
pub fn strip_guide_extension(filename: &str) -> &str {
    for ext in [".md.jinja", ".md"] {
        if filename.len() > ext.len() && filename.to_ascii_lowercase().ends_with(ext) {
            return &filename[..filename.len() - ext.len()];
        }
    }
    filename
}

/// The comparable, sortable identity of a guide, computed once from its
/// filename at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    prefix: Option<u64>,
    parts: Vec<String>,
}

impl Identity {
    /// Parse a filename (with or without extension) into an identity.
    ///
    /// Leading zeros in the numeric prefix are discarded, so `007_setup`
    /// and `7_setup` share a prefix.
    #[must_use]
    pub fn parse(filename: &str) -> Self {
        let name = normalize(strip_guide_extension(filename));
        if let Some(caps) = PREFIXED.captures(&name) {
            // A prefix too large for u64 is treated as part of the name.
            if let Ok(prefix) = caps[1].parse::<u64>() {
                return Self {
                    prefix: Some(prefix),
                    parts: split_parts(&caps[2]),
                };
            }
        }
        Self {
            prefix: None,
            parts: split_parts(&name),
        }
    }

    /// Numeric ordering prefix, if the filename carried one.
    #[must_use]
    pub fn prefix(&self) -> Option<u64> {
        self.prefix
    }

    /// Normalized name tokens, prefix excluded.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The underscore-joined normalized name, prefix excluded.
    #[must_use]
    pub fn joined(&self) -> String {
        self.parts.join("_")
    }

    /// Human friendly form of the name: each part capitalized and joined
    /// by a single space. Does not include the prefix.
    #[must_use]
    pub fn humanized(&self) -> String {
        self.parts
            .iter()
            .map(|part| capitalize(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.prefix, other.prefix) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.joined().cmp(&other.joined())),
            // A present prefix always sorts before an absent one.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.joined().cmp(&other.joined()),
        }
    }
}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn split_parts(name: &str) -> Vec<String> {
    name.split('_')
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_separators_and_downcases() {
        assert_eq!(normalize("Getting Started"), "getting_started");
        assert_eq!(normalize("network-setup"), "network_setup");
        assert_eq!(normalize("A  b\t-c"), "a_b_c");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Getting Started", "net-work set_up", "  leading", "UP-DOWN"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn parse_extracts_numeric_prefix() {
        let id = Identity::parse("02_Network-Setup.md");
        assert_eq!(id.prefix(), Some(2));
        assert_eq!(id.parts(), ["network", "setup"]);
    }

    #[test]
    fn parse_discards_leading_zeros() {
        assert_eq!(
            Identity::parse("007_setup.md"),
            Identity::parse("7_setup.md")
        );
    }

    #[test]
    fn parse_without_prefix() {
        let id = Identity::parse("getting started.md");
        assert_eq!(id.prefix(), None);
        assert_eq!(id.parts(), ["getting", "started"]);
    }

    #[test]
    fn parse_strips_template_extension() {
        let id = Identity::parse("03_cluster_info.md.jinja");
        assert_eq!(id.prefix(), Some(3));
        assert_eq!(id.parts(), ["cluster", "info"]);
    }

    #[test]
    fn prefixed_sorts_before_unprefixed() {
        let prefixed = Identity::parse("99_zz.md");
        let unprefixed = Identity::parse("aa.md");
        assert!(prefixed < unprefixed);
    }

    #[test]
    fn prefixes_compare_numerically() {
        let two = Identity::parse("2_b.md");
        let ten = Identity::parse("10_a.md");
        assert!(two < ten);
    }

    #[test]
    fn equal_prefixes_compare_by_joined_name() {
        let a = Identity::parse("1_alpha.md");
        let b = Identity::parse("1_beta.md");
        assert!(a < b);
    }

    #[test]
    fn ordering_is_transitive() {
        let mut ids = vec![
            Identity::parse("unprefixed.md"),
            Identity::parse("10_j.md"),
            Identity::parse("2_z.md"),
            Identity::parse("2_a.md"),
            Identity::parse("another.md"),
        ];
        ids.sort();
        let joined: Vec<String> = ids.iter().map(Identity::joined).collect();
        assert_eq!(joined, ["a", "z", "j", "another", "unprefixed"]);
    }

    #[test]
    fn humanized_title() {
        let id = Identity::parse("01_getting_started.md");
        assert_eq!(id.humanized(), "Getting Started");
    }
}
