use anyhow::Context;

use userhub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    userhub_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting user directory server");

    let app = userhub_api::app::build_app(&config)
        .await
        .context("failed to initialize user directory")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
