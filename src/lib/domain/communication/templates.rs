//! Template rendering

use std::collections::HashMap;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::errors::TemplateRenderError;

/// Variables made available to a template
pub type TemplateVariables = HashMap<String, serde_json::Value>;

/// Renders email bodies from named templates
pub trait TemplateRenderer: Send + Sync + 'static {
    /// Render a template
    ///
    /// # Arguments
    /// * `template_id` - The identifier of the template.
    /// * `variables` - The values substituted into the template.
    ///
    /// # Returns
    /// The rendered body, or a [`TemplateRenderError`].
    fn render(
        &self,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> Result<String, TemplateRenderError>;
}

#[cfg(test)]
mock! {
    pub TemplateRenderer {}

    impl TemplateRenderer for TemplateRenderer {
        fn render(&self, template_id: &str, variables: &TemplateVariables) -> Result<String, TemplateRenderError>;
    }
}
