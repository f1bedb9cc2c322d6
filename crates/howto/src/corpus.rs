//! Corpus loading: enumerate, filter, sort, and index guide files.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{HowtoError, Result};
use crate::guide::Guide;
use crate::template::TemplateContext;

/// Accepted guide filename extensions.
const GUIDE_EXTENSIONS: [&str; 2] = [".md", ".md.jinja"];

/// All visible guides of one invocation, sorted by identity and indexed
/// 1..N. Rebuilt fresh on every run.
#[derive(Debug, Default)]
pub struct Corpus {
    guides: Vec<Guide>,
}

impl Corpus {
    /// Scan `config.howto_dir` (flat, non-recursive) and build the corpus.
    ///
    /// Admin-only guides are dropped for unprivileged callers, which
    /// forces their metadata to parse at load time; this is the one place
    /// a frontmatter error aborts the whole command. A missing or empty
    /// directory yields an empty corpus.
    ///
    /// # Errors
    ///
    /// Frontmatter failures from the admin check and directory read
    /// failures.
    pub fn load(config: &Config) -> Result<Self> {
        let dir = &config.howto_dir;
        if !dir.is_dir() {
            log::warn!("guide directory not found: {}", dir.display());
            return Ok(Self::default());
        }

        let mut template_ctx: Option<TemplateContext> = None;
        let mut guides = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
            let entry = entry.map_err(|err| walk_error(dir, err))?;
            if !entry.file_type().is_file() || !is_guide_file(entry.path()) {
                continue;
            }

            let path = entry.path().to_path_buf();
            let template = if Guide::is_template(&path) {
                if template_ctx.is_none() {
                    template_ctx = Some(TemplateContext::load(config.context_dir.as_deref())?);
                }
                template_ctx.clone()
            } else {
                None
            };

            let guide = Guide::new(path, template);
            if !config.privileged && guide.is_admin_only()? {
                log::debug!("skipping admin-only guide {}", guide.path().display());
                continue;
            }
            guides.push(guide);
        }

        // Stable sort keeps duplicate identities in enumeration order.
        guides.sort_by(|a, b| a.identity().cmp(b.identity()));
        for (position, guide) in guides.iter_mut().enumerate() {
            guide.assign_display_index(position + 1);
        }
        log::info!("loaded {} guides from {}", guides.len(), dir.display());
        Ok(Self { guides })
    }

    /// Look up a guide by its numeric filename prefix. Leading zeros are
    /// stripped to match filename processing, so `07` finds `7_setup.md`.
    #[must_use]
    pub fn find_by_index(&self, raw: &str) -> Option<&Guide> {
        let digits = raw.trim().trim_start_matches('0');
        let wanted: u64 = if digits.is_empty() {
            0
        } else {
            digits.parse().ok()?
        };
        self.guides
            .iter()
            .find(|guide| guide.identity().prefix() == Some(wanted))
    }

    /// Guides in display order.
    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Iterator over guides in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Guide> {
        self.guides.iter()
    }

    /// Number of visible guides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guides.len()
    }

    /// Whether the corpus holds no visible guides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Guide;
    type IntoIter = std::slice::Iter<'a, Guide>;

    fn into_iter(self) -> Self::IntoIter {
        self.guides.iter()
    }
}

fn is_guide_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            let lower = name.to_ascii_lowercase();
            GUIDE_EXTENSIONS
                .iter()
                .any(|ext| lower.ends_with(ext) && lower.len() > ext.len())
        })
}

fn walk_error(dir: &Path, err: walkdir::Error) -> HowtoError {
    let path = err
        .path()
        .map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
    match err.into_io_error() {
        Some(source) => HowtoError::FileUnreadable { path, source },
        None => HowtoError::Internal(format!("walk loop at {}", path.display())),
    }
}
