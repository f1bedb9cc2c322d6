//! A single guide document: identity, cached metadata and body, rendering.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::error::{HowtoError, Result};
use crate::frontmatter::{self, MetaValue, Metadata, Parsed};
use crate::identity::Identity;
use crate::render::{RenderError, Renderer};
use crate::template::TemplateContext;

/// One markdown (optionally templated) file in the corpus.
///
/// The identity is computed eagerly at construction; metadata and body are
/// parsed on first access and cached for the lifetime of the owning
/// [`crate::corpus::Corpus`].
#[derive(Debug)]
pub struct Guide {
    path: PathBuf,
    identity: Identity,
    display_index: Option<usize>,
    template: Option<TemplateContext>,
    parsed: OnceCell<Parsed>,
}

impl Guide {
    /// Construct a guide for `path`. `template` must be supplied for
    /// `*.md.jinja` guides and is ignored otherwise.
    pub(crate) fn new(path: PathBuf, template: Option<TemplateContext>) -> Self {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let identity = Identity::parse(filename);
        Self {
            path,
            identity,
            display_index: None,
            template,
            parsed: OnceCell::new(),
        }
    }

    /// Whether the filename indicates a templated guide.
    #[must_use]
    pub fn is_template(path: &Path) -> bool {
        path.to_str()
            .is_some_and(|p| p.to_ascii_lowercase().ends_with(".md.jinja"))
    }

    /// Filesystem path of the guide. Unique within its corpus.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The comparable identity parsed from the filename.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// 1-based position after corpus-wide sort.
    ///
    /// # Errors
    ///
    /// [`HowtoError::Internal`] when read before the corpus assigned it;
    /// that is a bug in the caller, not a user error.
    pub fn display_index(&self) -> Result<usize> {
        self.display_index.ok_or_else(|| {
            HowtoError::Internal(format!(
                "display index of {} read before corpus assignment",
                self.path.display()
            ))
        })
    }

    pub(crate) fn assign_display_index(&mut self, index: usize) {
        self.display_index = Some(index);
    }

    fn parsed(&self) -> Result<&Parsed> {
        self.parsed.get_or_try_init(|| {
            let mut parsed = frontmatter::parse(&self.path)?;
            if Self::is_template(&self.path) {
                let ctx = self.template.clone().unwrap_or_default();
                parsed.body = ctx.render(&parsed.body, &self.path)?;
            }
            Ok(parsed)
        })
    }

    /// Decoded metadata, parsed and cached on first access.
    ///
    /// # Errors
    ///
    /// Propagates any parse failure from [`frontmatter::parse`].
    pub fn metadata(&self) -> Result<&Metadata> {
        Ok(&self.parsed()?.metadata)
    }

    /// Guide body with the metadata block stripped, parsed and cached on
    /// first access. Templated guides are rendered before caching.
    ///
    /// # Errors
    ///
    /// Propagates any parse or template failure.
    pub fn body(&self) -> Result<&str> {
        Ok(&self.parsed()?.body)
    }

    /// Whether the guide is restricted to privileged users.
    ///
    /// # Errors
    ///
    /// Propagates metadata parse failures.
    pub fn is_admin_only(&self) -> Result<bool> {
        Ok(self
            .metadata()?
            .get("admin")
            .and_then(MetaValue::as_bool)
            .unwrap_or(false))
    }

    /// Human friendly title derived from the identity parts.
    #[must_use]
    pub fn humanized_title(&self) -> String {
        self.identity.humanized()
    }

    /// Render the body for a terminal at the given width (`None` detects
    /// the terminal width). A renderer failure is logged and degrades to
    /// the raw body so a rendering bug never blocks content display.
    ///
    /// # Errors
    ///
    /// Only parse/template failures propagate; render failures degrade.
    pub fn render(&self, width: Option<u16>) -> Result<String> {
        let body = self.body()?;
        Ok(Self::rendered_or_raw(
            Renderer::new(width).render(body),
            body,
            &self.path,
        ))
    }

    fn rendered_or_raw(
        rendered: std::result::Result<String, RenderError>,
        body: &str,
        path: &Path,
    ) -> String {
        match rendered {
            Ok(text) => text,
            Err(err) => {
                log::warn!(
                    "rendering {} failed ({err}), falling back to raw markdown",
                    path.display()
                );
                body.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_guide(dir: &Path, name: &str, content: &str) -> Guide {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        Guide::new(path, None)
    }

    #[test]
    fn metadata_and_body_are_cached() {
        let dir = tempfile::TempDir::new().unwrap();
        let guide = write_guide(dir.path(), "01_intro.md", ":admin = true\n\nHello\n");
        assert!(guide.is_admin_only().unwrap());
        // Remove the file; the cached parse must keep serving.
        std::fs::remove_file(guide.path()).unwrap();
        assert_eq!(guide.body().unwrap(), "Hello\n");
    }

    #[test]
    fn humanized_title_capitalizes_parts() {
        let dir = tempfile::TempDir::new().unwrap();
        let guide = write_guide(dir.path(), "02_network_setup.md", "Body");
        assert_eq!(guide.humanized_title(), "Network Setup");
    }

    #[test]
    fn display_index_before_assignment_is_internal_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let guide = write_guide(dir.path(), "01_intro.md", "Body");
        assert!(matches!(
            guide.display_index(),
            Err(HowtoError::Internal(_))
        ));
    }

    #[test]
    fn templated_body_is_rendered() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("05_cluster.md.jinja");
        std::fs::write(&path, "Welcome to {{ cluster }}").unwrap();
        let ctx_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(ctx_dir.path().join("ctx.yaml"), "cluster: alpha").unwrap();
        let ctx = TemplateContext::load(Some(ctx_dir.path())).unwrap();
        let guide = Guide::new(path, Some(ctx));
        assert_eq!(guide.body().unwrap(), "Welcome to alpha");
    }

    #[test]
    fn render_produces_non_empty_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let guide = write_guide(dir.path(), "01_intro.md", "# Title\n\nSome text\n");
        let out = guide.render(Some(100)).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn render_failure_degrades_to_raw_body() {
        let body = "# Title\n\nSome text\n";
        let out = Guide::rendered_or_raw(
            Err(RenderError::Unbalanced),
            body,
            Path::new("/guides/01_intro.md"),
        );
        assert_eq!(out, body);
    }
}
