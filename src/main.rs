//! ShadowSleuth: Volume Shadow Copy triage tool.
//!
//! Thin binary entry point. All logic lives in the `shadowsleuth-core`
//! and `shadowsleuth-cli` crates.

fn main() -> anyhow::Result<()> {
    let cli = shadowsleuth_cli::Cli::from_env();

    // Logs go to stderr so the progress line on stdout stays intact.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("ShadowSleuth starting");

    shadowsleuth_cli::run(cli)
}
