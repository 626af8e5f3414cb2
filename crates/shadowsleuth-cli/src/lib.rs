/// ShadowSleuth CLI: terminal frontend for `shadowsleuth-core`.
///
/// Parses flags, prompts for anything missing, runs the session on a
/// background thread and renders its progress on one console line.
pub mod app;
pub mod args;
pub mod failure_log;
pub mod prompt;
pub mod render;

pub use app::App;
pub use args::Cli;

/// Run the tool against the process's stdin and stdout.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    App::new(cli, stdin.lock(), stdout.lock()).run()
}
