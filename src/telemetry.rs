use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_LEVEL_VAR: &str = "VITRINE_LOG_LEVEL";

pub(crate) fn init(json: bool) -> Result<()> {
    let filter = env_filter_merge_from_environment("info", LOG_LEVEL_VAR)?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_span_events(FmtSpan::CLOSE);

    // Boxed so both output formats fit the same registry type.
    let layer = if json {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let env_value = std::env::var(env_var).ok();
    merge_directives(default_directives, env_value.as_deref())
}

fn merge_directives(default_directives: &'static str, extra: Option<&str>) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Some(extra) = extra {
        for directive in extra.split(',').filter(|d| !d.trim().is_empty()) {
            match directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}
