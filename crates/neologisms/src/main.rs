use neologisms::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), NeologismsError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        http_bind = ?config.http_bind_addr,
        idle_timeout = ?config.idle_timeout,
        handshake_timeout = ?config.handshake_timeout,
        send_timeout = ?config.send_timeout,
        finish_when_exhausted = config.room.finish_when_exhausted,
        max_timer_secs = config.room.max_timer_secs,
        "starting"
    );

    let server = NeologismsServer::builder().config(config).build().await?;

    tokio::select! {
        result = server.run() => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
