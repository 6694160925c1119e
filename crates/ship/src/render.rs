//! Template rendering for the networking and kops configs.
//!
//! Templates are Handlebars files. Rendering runs in strict mode so a
//! placeholder without a matching context field fails the run instead of
//! silently rendering as an empty string, and escaping is disabled because
//! the outputs are HCL/YAML, not HTML.

use std::path::{Path, PathBuf};

use handlebars::{Handlebars, RenderErrorReason};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::error::RenderError;
use crate::state::NetworkIds;

/// Context for the kops template: cluster fields plus the provisioned
/// network resource IDs (`VPCID`, `PublicNATGatewayID`, `NodeSubnetID`,
/// `PublicSubnetID`).
#[derive(Debug, Serialize)]
pub struct ClusterContext<'a> {
    #[serde(flatten)]
    pub cluster: &'a ClusterConfig,
    #[serde(flatten)]
    pub network: &'a NetworkIds,
}

/// Renders template files against a serializable context.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a strict, non-escaping renderer.
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render the template at `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the template cannot be read or parsed,
    /// or references a field missing from `context`.
    pub fn render<T: Serialize>(&self, template: &Path, context: &T) -> Result<String, RenderError> {
        let source = std::fs::read_to_string(template).map_err(|source| RenderError::Read {
            path: template.to_path_buf(),
            source,
        })?;

        self.render_str(template, &source, context)
    }

    /// Render template text; `name` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// See [`TemplateRenderer::render`].
    pub fn render_str<T: Serialize>(
        &self,
        name: &Path,
        source: &str,
        context: &T,
    ) -> Result<String, RenderError> {
        self.handlebars
            .render_template(source, context)
            .map_err(|e| {
                let path = name.to_path_buf();
                if matches!(e.reason(), RenderErrorReason::TemplateError(_)) {
                    RenderError::Template {
                        path,
                        source: Box::new(e),
                    }
                } else {
                    RenderError::Render {
                        path,
                        source: Box::new(e),
                    }
                }
            })
    }

    /// Render `template` with `context` and write the result to `output`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if rendering fails or `output` cannot be
    /// written.
    pub fn render_to<T: Serialize>(
        &self,
        template: &Path,
        context: &T,
        output: &Path,
    ) -> Result<PathBuf, RenderError> {
        let rendered = self.render(template, context)?;
        std::fs::write(output, rendered.as_bytes()).map_err(|source| RenderError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        info!(
            template = %template.display(),
            output = %output.display(),
            "Rendered config"
        );
        debug!(bytes = rendered.len(), "Rendered config size");

        Ok(output.to_path_buf())
    }
}
