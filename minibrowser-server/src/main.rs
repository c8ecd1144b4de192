use anyhow::Context;
use minibrowser::service::BrowserService;
use minibrowser_server::{init_tracing, router, ServerSettings};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ServerSettings::from_env().context("failed to load settings")?;
    init_tracing(settings.log_format);

    let service = Arc::new(BrowserService::with_chrome(settings.browser.clone()));
    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;

    info!(
        bind = %settings.bind,
        max_concurrent_fetches = settings.browser.max_concurrent_fetches,
        extraction = ?settings.browser.extraction,
        "Minibrowser listening"
    );
    axum::serve(listener, router(service))
        .await
        .context("server terminated")?;
    Ok(())
}
