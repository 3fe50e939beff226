use html_minifier::HTMLMinifier;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("rendering error")]
    Tera(#[from] tera::Error),
}

/// Renders `template`, minifying the output when asked. Minifier failures fall
/// back to the unminified markup.
pub(super) fn render(
    tera: &Tera,
    template: &'static str,
    context: &Context,
    minify: bool,
) -> Result<String, TemplateError> {
    let rendered = tera.render(template, context)?;
    if !minify {
        return Ok(rendered);
    }

    let mut html_minifier = HTMLMinifier::new();
    if let Err(err) = html_minifier.digest(&rendered) {
        error!("Failed to minify HTML: {}", err);
        return Ok(rendered);
    };

    let minified = match std::str::from_utf8(html_minifier.get_html()) {
        Ok(minified) => minified.to_string(),
        Err(err) => {
            error!("Failed to parse minified HTML as UTF-8: {}", err);
            rendered
        },
    };

    Ok(minified)
}
