//! Tests for query resolution and the full-text body index.

use std::path::Path;

use tempfile::TempDir;

use howto::{BodyIndex, Config, Corpus, Outcome, matcher};

fn config(dir: &Path) -> Config {
    Config {
        howto_dir: dir.to_path_buf(),
        context_dir: None,
        privileged: false,
        width: Some(100),
    }
}

fn standard_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    let write = |name: &str, content: &str| {
        std::fs::write(dir.path().join(name), content).unwrap();
    };
    write(
        "01_getting_started.md",
        "# Getting Started\n\nFirst steps on the cluster\n",
    );
    write(
        "02_network_setup.md",
        "# Network Setup\n\nConfigure interfaces and routing\n",
    );
    write("10_admin_only.md", ":admin = true\n\nRoot procedures\n");
    dir
}

#[test]
fn unique_match_by_token_prefix() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    match matcher::resolve(&corpus, "net") {
        Outcome::Unique(guide) => assert_eq!(guide.humanized_title(), "Network Setup"),
        other => panic!("expected unique match, got {other:?}"),
    }
}

#[test]
fn shared_token_prefix_is_ambiguous() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("01_server_backup.md"), "a").unwrap();
    std::fs::write(dir.path().join("02_server_restore.md"), "b").unwrap();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    match matcher::resolve(&corpus, "server") {
        Outcome::Ambiguous(candidates) => {
            assert_eq!(candidates.len(), 2);
            // Candidates arrive in display order.
            let indexes: Vec<usize> = candidates
                .iter()
                .map(|g| g.display_index().unwrap())
                .collect();
            assert_eq!(indexes, [1, 2]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn filtered_admin_guides_are_not_found() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    assert!(matches!(
        matcher::resolve(&corpus, "admin"),
        Outcome::NotFound
    ));
}

#[test]
fn multi_token_queries_use_and_semantics() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    assert!(matches!(
        matcher::resolve(&corpus, "network printer"),
        Outcome::NotFound
    ));
    assert!(matches!(
        matcher::resolve(&corpus, "set net"),
        Outcome::Unique(_)
    ));
}

#[test]
fn query_separators_and_case_are_irrelevant() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    for query in ["Network-Setup", "network setup", "NETWORK_SETUP"] {
        assert!(
            matches!(matcher::resolve(&corpus, query), Outcome::Unique(_)),
            "query {query:?} should resolve uniquely"
        );
    }
}

#[test]
fn exact_resolution_requires_the_full_name() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    assert!(matches!(
        matcher::resolve_exact(&corpus, "net"),
        Outcome::NotFound
    ));
    assert!(matches!(
        matcher::resolve_exact(&corpus, "Network-Setup"),
        Outcome::Unique(_)
    ));
}

#[test]
fn body_index_finds_content_words_by_prefix() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    let index = BodyIndex::build(&corpus).unwrap();

    let hits = index.query(&corpus, "rout");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].humanized_title(), "Network Setup");

    // AND semantics over body tokens.
    assert!(index.query(&corpus, "first routing").is_empty());
    assert!(index.query(&corpus, "nothing matches this").is_empty());
}

#[test]
fn body_index_results_are_in_display_order() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("03_zebra.md"), "shared topic word").unwrap();
    std::fs::write(dir.path().join("01_apple.md"), "shared topic word").unwrap();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    let index = BodyIndex::build(&corpus).unwrap();
    let hits = index.query(&corpus, "shared");
    let indexes: Vec<usize> = hits.iter().map(|g| g.display_index().unwrap()).collect();
    assert_eq!(indexes, [1, 2]);
}

#[test]
fn end_to_end_render_produces_wrapped_output() {
    let dir = standard_corpus();
    let corpus = Corpus::load(&config(dir.path())).unwrap();
    let Outcome::Unique(guide) = matcher::resolve(&corpus, "getting") else {
        panic!("expected unique match");
    };
    let rendered = guide.render(Some(100)).unwrap();
    assert!(!rendered.is_empty());
    for line in rendered.lines() {
        assert!(line.len() <= 200, "line unreasonably long: {line:?}");
    }
}
