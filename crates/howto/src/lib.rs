//! howto - search and display markdown user guides in the terminal.
//!
//! The pipeline locates a directory of guide documents, extracts
//! structured frontmatter from each, resolves a possibly partial name to
//! a unique guide, and renders it as ANSI-colored, word-wrapped text.
//!
//! # Architecture
//!
//! ```text
//! howto/src/
//! ├── lib.rs          # Main module and exports
//! ├── identity.rs     # Name normalization + sortable guide identity
//! ├── frontmatter.rs  # Metadata block parsing (fenced YAML / :key lines)
//! ├── guide.rs        # Guide document: cached metadata, body, rendering
//! ├── corpus.rs       # Directory scan, admin filter, sort, display index
//! ├── matcher.rs      # Token-prefix query resolution
//! ├── index.rs        # Full-text body index (alternate search strategy)
//! ├── render.rs       # Markdown -> ANSI with indent-preserving wrap
//! ├── template.rs     # minijinja context for *.md.jinja guides
//! ├── lister.rs       # Tabulated listings
//! ├── config.rs       # Process configuration
//! └── error.rs        # Closed error enum with exit-code mapping
//! ```
//!
//! Everything is single-threaded and synchronous: one process, one
//! invocation, one corpus built and discarded per run.

pub mod config;
pub mod corpus;
pub mod error;
pub mod frontmatter;
pub mod guide;
pub mod identity;
pub mod index;
pub mod lister;
pub mod matcher;
pub mod render;
pub mod template;

pub use config::Config;
pub use corpus::Corpus;
pub use error::{HowtoError, Result};
pub use frontmatter::{MetaValue, Metadata};
pub use guide::Guide;
pub use identity::{Identity, normalize};
pub use index::BodyIndex;
pub use matcher::{Outcome, resolve};
pub use render::Renderer;
pub use template::TemplateContext;
