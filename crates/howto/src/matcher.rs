//! Query resolution over the corpus.
//!
//! A query is normalized, split into de-duplicated tokens, and matched
//! with AND semantics: a guide qualifies when every token is a prefix of
//! at least one of its identity parts. The resolver reports exactly how
//! many guides qualified; it never auto-picks among several.

use crate::corpus::Corpus;
use crate::guide::Guide;
use crate::identity::normalize;

/// Result of resolving a query against the corpus.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Exactly one guide matched.
    Unique(&'a Guide),
    /// Several guides matched; candidates in display order.
    Ambiguous(Vec<&'a Guide>),
    /// Nothing matched.
    NotFound,
}

/// Normalize a raw query into de-duplicated search tokens, preserving
/// first-seen order.
#[must_use]
pub fn search_tokens(query: &str) -> Vec<String> {
    let normalized = normalize(query);
    let mut tokens: Vec<String> = Vec::new();
    for token in normalized.split('_').filter(|t| !t.is_empty()) {
        if !tokens.iter().any(|seen| seen == token) {
            tokens.push(token.to_owned());
        }
    }
    tokens
}

/// Resolve `query` to zero, one, or many guides.
///
/// An empty token set matches every guide; callers validate queries
/// before resolving.
#[must_use]
pub fn resolve<'a>(corpus: &'a Corpus, query: &str) -> Outcome<'a> {
    let tokens = search_tokens(query);
    let mut candidates: Vec<&Guide> = corpus
        .iter()
        .filter(|guide| matches(guide, &tokens))
        .collect();
    match candidates.len() {
        0 => Outcome::NotFound,
        1 => Outcome::Unique(candidates.remove(0)),
        _ => Outcome::Ambiguous(candidates),
    }
}

/// Resolve `query` requiring the whole normalized name to match, with no
/// prefix searching. Ambiguity is still possible: duplicate names under
/// different numeric prefixes share an identity name.
#[must_use]
pub fn resolve_exact<'a>(corpus: &'a Corpus, query: &str) -> Outcome<'a> {
    let wanted = normalize(query);
    let mut candidates: Vec<&Guide> = corpus
        .iter()
        .filter(|guide| guide.identity().joined() == wanted)
        .collect();
    match candidates.len() {
        0 => Outcome::NotFound,
        1 => Outcome::Unique(candidates.remove(0)),
        _ => Outcome::Ambiguous(candidates),
    }
}

/// Every token must be a prefix of at least one identity part.
fn matches(guide: &Guide, tokens: &[String]) -> bool {
    tokens.iter().all(|token| {
        guide
            .identity()
            .parts()
            .iter()
            .any(|part| part.starts_with(token.as_str()))
    })
}
