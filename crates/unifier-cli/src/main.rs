use std::process::ExitCode;

use clap::Parser;
use unifier_cli::{Args, run_pipeline};
use unifier_core::Config;
use unifier_docker::DockerClient;

/// Exit status for any failed run.
const FAILURE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="unset or invalid RUST_LOG falls back to info"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERRO: {e:#}");
            ExitCode::from(FAILURE)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let cfg = Config::from_settings(args.into_settings(today)?)?;
    let client = DockerClient::new(&cfg);

    run_pipeline(&cfg, &client).await?;
    Ok(())
}
