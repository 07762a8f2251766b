use clap::Parser;
use todo_server::{app, init_tracing, shutdown_signal, Config, Lifecycle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing();

    let outcome = Lifecycle::new(config.grace_period())
        .bind_and_serve(config.bind_addr(), app(), shutdown_signal())
        .await
        .inspect_err(|err| tracing::error!(error = %err, "server failed"))?;

    tracing::info!(?outcome, "goodbye");
    Ok(())
}
