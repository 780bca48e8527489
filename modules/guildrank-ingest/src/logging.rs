use anyhow::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &[&str] = &[
    "guildrank=info",
    "wayback_client=info",
    "browserless_client=info",
];

/// `base` plus info-level output for this workspace's own crates.
pub fn with_default_directives(base: EnvFilter) -> Result<EnvFilter> {
    DEFAULT_DIRECTIVES
        .iter()
        .try_fold(base, |filter, directive| -> Result<EnvFilter> {
            Ok(filter.add_directive(directive.parse()?))
        })
}

/// Install the fmt subscriber, honouring `RUST_LOG` on top of the defaults.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(with_default_directives(EnvFilter::from_default_env())?)
        .init();
    Ok(())
}
