//! Template engine
//!
//! Thin wrapper around Tera. Templates are loaded once at startup from
//! the configured directory; every page receives the current user (when
//! authenticated) under the `user` key.

use anyhow::{Context as _, Result};
use axum::response::Html;
use tera::{Context, Tera};

use crate::models::User;

/// Template engine for rendering HTML pages
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load every `.html` template below `templates_dir`.
    pub fn new(templates_dir: &std::path::Path) -> Result<Self> {
        let glob = format!("{}/**/*.html", templates_dir.display());
        let tera = Tera::new(&glob)
            .with_context(|| format!("Failed to load templates from {:?}", templates_dir))?;

        Ok(Self { tera })
    }

    /// Build a context pre-populated with the viewer.
    pub fn context_for(viewer: Option<&User>) -> Context {
        let mut context = Context::new();
        if let Some(user) = viewer {
            context.insert("user", user);
        }
        context
    }

    /// Render a template to an HTML response.
    pub fn render(&self, template: &str, context: &Context) -> Result<Html<String>> {
        let body = self
            .tera
            .render(template, context)
            .with_context(|| format!("Failed to render template '{}'", template))?;
        Ok(Html(body))
    }

    /// Get the Tera instance (tests)
    #[cfg(test)]
    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_crate_templates() {
        let engine = TemplateEngine::new(std::path::Path::new("templates"))
            .expect("bundled templates should load");

        let names: Vec<&str> = engine.tera().get_template_names().collect();
        assert!(names.contains(&"base.html"));
        assert!(names.contains(&"blog/index.html"));
        assert!(names.contains(&"blog/detail.html"));
    }

    #[test]
    fn test_context_for_inserts_user() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            String::new(),
            String::new(),
            "hash".to_string(),
        );

        let anonymous = TemplateEngine::context_for(None);
        assert!(anonymous.get("user").is_none());

        let authed = TemplateEngine::context_for(Some(&user));
        assert!(authed.get("user").is_some());
    }
}
