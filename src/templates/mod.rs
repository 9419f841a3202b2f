//! Template engine
//!
//! HTML pages are rendered with Tera. Templates ship inside the binary
//! (`templates/` at the crate root); setting `templates.path` in the config
//! swaps in an on-disk directory with the same layout, which is handy for
//! editing markup without a rebuild.

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::models::User;

mod error;

pub use error::TemplateError;

/// Templates compiled into the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

/// The logged-in user as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin(),
        }
    }
}

/// Tera wrapper holding every page template
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load templates from `path` when it exists, otherwise the embedded set
    pub fn new(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(dir) if dir.is_dir() => {
                tracing::info!("Loading templates from {:?}", dir);
                Self::from_dir(dir)
            }
            Some(dir) => {
                tracing::warn!("Template directory {:?} not found, using embedded templates", dir);
                Self::embedded()
            }
            None => Self::embedded(),
        }
    }

    /// Templates compiled into the binary
    pub fn embedded() -> Result<Self> {
        let mut templates = Vec::new();
        for name in EmbeddedTemplates::iter() {
            let file = EmbeddedTemplates::get(&name)
                .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("Template is not UTF-8: {}", name))?;
            templates.push((name.to_string(), content));
        }
        Self::from_templates(templates)
    }

    /// Templates read from a directory tree
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut templates = Vec::new();
        collect_templates_from_dir(dir, dir, &mut templates)?;
        Self::from_templates(templates)
    }

    fn from_templates(mut templates: Vec<(String, String)>) -> Result<Self> {
        // Base templates first so children can resolve their parent
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html" || a.0.ends_with("/base.html");
            let b_is_base = b.0 == "base.html" || b.0.ends_with("/base.html");
            b_is_base.cmp(&a_is_base).then_with(|| a.0.cmp(&b.0))
        });

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::TemplateError(format!("Failed to add templates: {}", e)))?;

        tracing::debug!("Loaded {} templates", tera.get_template_names().count());

        Ok(Self { tera })
    }

    /// Whether a template with this name is loaded
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            TemplateError::TemplateError(error_msg).into()
        })
    }
}

/// Context every page starts from: the current user and an empty error map
pub fn page_context(user: Option<&User>) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("current_user", &user.map(CurrentUser::from));
    context.insert("errors", &crate::models::FieldErrors::new());
    context
}

fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path).map_err(TemplateError::from)? {
        let path = entry.map_err(TemplateError::from)?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| TemplateError::TemplateError("Failed to get relative path".to_string()))?;

            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;

            templates.push((template_name, content));
        }
    }

    Ok(())
}
