//! Template engine for the HTML preview pages using Jinja2 syntax.
//!
//! Templates live in `templates/` at the crate root and are compiled into the
//! binary. Names ending in `.html` are auto-escaped, so user-controlled values
//! (file content, filenames) can be passed in as-is.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    (
        "preview/text.html",
        include_str!("../../../templates/preview/text.html"),
    ),
    (
        "preview/pdf.html",
        include_str!("../../../templates/preview/pdf.html"),
    ),
    (
        "preview/download.html",
        include_str!("../../../templates/preview/download.html"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
///
/// # Example
/// ```ignore
/// use minijinja::context;
///
/// let html = render_template(
///     "preview/download.html",
///     context! { filename => "a.zip", code => "FV-3F9A0C1D" },
/// )?;
/// ```
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_load() {
        for (name, _) in TEMPLATES {
            assert!(get_environment().get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_missing_template() {
        let result = render_template("definitely_not_a_real_template.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_text_preview_escapes_content() {
        let html = render_template(
            "preview/text.html",
            context! {
                filename => "notes.txt",
                content => "<script>alert(1)</script>",
                code => "FV-3F9A0C1D",
            },
        )
        .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<h1>notes.txt</h1>"));
        assert!(html.contains("href=\"/api/download/FV-3F9A0C1D\""));
    }
}
