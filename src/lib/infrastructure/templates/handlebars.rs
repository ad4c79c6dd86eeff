//! Handlebars template renderer

use std::{fmt, path::Path};

use anyhow::{anyhow, Context, Result};
use handlebars::Handlebars;
use tracing::debug;

use crate::domain::communication::{
    errors::TemplateRenderError,
    templates::{TemplateRenderer, TemplateVariables},
};

const TEMPLATE_EXTENSION: &str = "hbs";

/// Renders templates with Handlebars, optionally inlining CSS into the result
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
    inline_css: bool,
}

impl HandlebarsRenderer {
    /// Creates a renderer with no templates, in strict mode
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        Self {
            handlebars,
            inline_css: false,
        }
    }

    /// Loads every `*.hbs` file of `dir`; the file stem is the template id
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut renderer = Self::new();

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("template directory not found: {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();

            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }

            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| anyhow!("invalid template file name: {}", path.display()))?
                .to_string();

            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("could not read template {}", path.display()))?;

            debug!("Registering template {id} from {}", path.display());

            renderer.register_template(&id, &source)?;
        }

        Ok(renderer)
    }

    /// Inline `<style>` rules into `style` attributes after rendering
    pub fn with_css_inlining(mut self, inline_css: bool) -> Self {
        self.inline_css = inline_css;
        self
    }

    /// Registers a template under `id`
    pub fn register_template(&mut self, id: &str, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(id, source)
            .with_context(|| format!("invalid template {id}"))
    }

    /// Whether a template is registered under `id`
    pub fn has_template(&self, id: &str) -> bool {
        self.handlebars.has_template(id)
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut templates: Vec<&String> = self.handlebars.get_templates().keys().collect();
        templates.sort();

        f.debug_struct("HandlebarsRenderer")
            .field("templates", &templates)
            .field("inline_css", &self.inline_css)
            .finish()
    }
}

impl From<handlebars::RenderError> for TemplateRenderError {
    fn from(err: handlebars::RenderError) -> Self {
        debug!("RenderError -> TemplateRenderError");

        TemplateRenderError::UnknownError(err.into())
    }
}

impl From<css_inline::InlineError> for TemplateRenderError {
    fn from(err: css_inline::InlineError) -> Self {
        debug!("InlineError -> TemplateRenderError");

        TemplateRenderError::UnknownError(err.into())
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> Result<String, TemplateRenderError> {
        if !self.has_template(template_id) {
            return Err(TemplateRenderError::TemplateNotFound(
                template_id.to_string(),
            ));
        }

        let rendered = self.handlebars.render(template_id, variables)?;

        if self.inline_css {
            return Ok(css_inline::inline(&rendered)?);
        }

        Ok(rendered)
    }
}
