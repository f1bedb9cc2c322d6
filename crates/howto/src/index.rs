//! Full-text body index, the alternate search strategy.
//!
//! An inverted index from body tokens to corpus slots, queried with
//! token-prefix AND semantics like the name matcher. Results come back in
//! display order; the index never participates in disambiguation scoring.

use std::collections::{BTreeMap, BTreeSet};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::guide::Guide;
use crate::matcher::search_tokens;

/// Inverted index over tokenized guide bodies, keyed by corpus slot.
#[derive(Debug, Default)]
pub struct BodyIndex {
    postings: BTreeMap<String, BTreeSet<usize>>,
}

impl BodyIndex {
    /// Tokenize every guide body in the corpus and build the index.
    ///
    /// # Errors
    ///
    /// Propagates body parse failures.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        let mut postings: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for (slot, guide) in corpus.iter().enumerate() {
            for token in tokenize(guide.body()?) {
                postings.entry(token).or_default().insert(slot);
            }
        }
        Ok(Self { postings })
    }

    /// Guides whose bodies contain, for every query token, at least one
    /// word starting with it. Results are in display order.
    #[must_use]
    pub fn query<'a>(&self, corpus: &'a Corpus, query: &str) -> Vec<&'a Guide> {
        let tokens = search_tokens(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut slots: Option<BTreeSet<usize>> = None;
        for token in &tokens {
            let hits = self.prefix_hits(token);
            slots = Some(match slots {
                Some(acc) => acc.intersection(&hits).copied().collect(),
                None => hits,
            });
            if slots.as_ref().is_some_and(BTreeSet::is_empty) {
                return Vec::new();
            }
        }

        // BTreeSet iterates slots ascending, which is display order.
        slots
            .unwrap_or_default()
            .into_iter()
            .filter_map(|slot| corpus.guides().get(slot))
            .collect()
    }

    /// Union of posting sets for every indexed token starting with
    /// `prefix`, gathered with a range scan.
    fn prefix_hits(&self, prefix: &str) -> BTreeSet<usize> {
        self.postings
            .range(prefix.to_owned()..)
            .take_while(|(token, _)| token.starts_with(prefix))
            .flat_map(|(_, slots)| slots.iter().copied())
            .collect()
    }
}

/// Lowercased alphanumeric runs of the body text.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_non_alphanumerics() {
        let tokens: Vec<String> = tokenize("Hello, world! v2.0").collect();
        assert_eq!(tokens, ["hello", "world", "v2", "0"]);
    }

    #[test]
    fn prefix_hits_cover_longer_tokens() {
        let mut index = BodyIndex::default();
        index.postings.insert("network".into(), [0].into());
        index.postings.insert("networking".into(), [1].into());
        index.postings.insert("note".into(), [2].into());
        assert_eq!(index.prefix_hits("net"), BTreeSet::from([0, 1]));
        assert_eq!(index.prefix_hits("no"), BTreeSet::from([2]));
        assert!(index.prefix_hits("zzz").is_empty());
    }
}
