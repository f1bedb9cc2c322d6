//! Rendering context for templated guides.
//!
//! Guides named `*.md.jinja` have their body (frontmatter already
//! stripped) run through `minijinja` with a context merged from YAML files
//! in the configured context directory. Missing directories and files are
//! as good as empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use minijinja::Environment;

use crate::error::{HowtoError, Result};

/// Merged key/value context shared by every templated guide in a corpus.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: BTreeMap<String, serde_yaml::Value>,
}

impl TemplateContext {
    /// Load and merge every `*.yaml`/`*.yml` file in `dir`, in name order.
    /// Later files override earlier keys.
    ///
    /// # Errors
    ///
    /// A context file that exists but cannot be read or does not decode to
    /// a YAML mapping fails the load; it would otherwise silently change
    /// what every templated guide renders.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut ctx = Self::default();
        let Some(dir) = dir else { return Ok(ctx) };
        if !dir.is_dir() {
            log::debug!("template context directory not found: {}", dir.display());
            return Ok(ctx);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|source| HowtoError::FileUnreadable {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yaml" | "yml")
                )
            })
            .collect();
        paths.sort();

        for path in paths {
            ctx.merge_file(&path)?;
        }
        Ok(ctx)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|source| HowtoError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| HowtoError::UnparseableMetadata {
                path: path.to_path_buf(),
                source,
            })?;
        match value {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(mapping) => {
                for (key, value) in mapping {
                    if let serde_yaml::Value::String(key) = key {
                        self.values.insert(key, value);
                    }
                }
            }
            _ => {
                return Err(HowtoError::InvalidMetadata {
                    path: path.to_path_buf(),
                });
            }
        }
        log::debug!("merged template context from {}", path.display());
        Ok(())
    }

    /// Render a guide body with this context. Undefined variables render
    /// as empty text rather than failing, matching the leniency of the
    /// guides' original templating.
    ///
    /// # Errors
    ///
    /// [`HowtoError::Template`] when the template itself is malformed.
    pub fn render(&self, source: &str, path: &Path) -> Result<String> {
        let env = Environment::new();
        env.render_str(source, &self.values)
            .map_err(|source| HowtoError::Template {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_renders_plain_text() {
        let ctx = TemplateContext::default();
        let out = ctx.render("plain body", Path::new("g.md.jinja")).unwrap();
        assert_eq!(out, "plain body");
    }

    #[test]
    fn context_files_are_merged_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "cluster: alpha\ndomain: x").unwrap();
        std::fs::write(dir.path().join("b.yaml"), "cluster: beta").unwrap();
        let ctx = TemplateContext::load(Some(dir.path())).unwrap();
        let out = ctx
            .render("{{ cluster }}.{{ domain }}", Path::new("g.md.jinja"))
            .unwrap();
        assert_eq!(out, "beta.x");
    }

    #[test]
    fn missing_directory_is_empty_context() {
        let ctx = TemplateContext::load(Some(Path::new("/nonexistent/context"))).unwrap();
        let out = ctx.render("ok", Path::new("g.md.jinja")).unwrap();
        assert_eq!(out, "ok");
    }

    #[test]
    fn non_mapping_context_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "- a\n- b").unwrap();
        assert!(matches!(
            TemplateContext::load(Some(dir.path())),
            Err(HowtoError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn broken_template_is_reported() {
        let ctx = TemplateContext::default();
        assert!(matches!(
            ctx.render("{% if %}", Path::new("g.md.jinja")),
            Err(HowtoError::Template { .. })
        ));
    }
}
