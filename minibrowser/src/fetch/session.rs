//! One engine instance, owned by exactly one fetch.

use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::{Browser, BrowserConfig as EngineConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::chrome::{launch_args, resolve_executable};
use super::profiles::BrowserProfile;
use crate::config::FetchConfig;
use crate::errors::BrowserError;

/// A launched headless browser and its protocol handler task.
///
/// Call [`Session::close`] on every exit path. Dropping an unclosed session
/// aborts the handler task, which tears down the connection, and the engine
/// process is killed with the [`Browser`].
pub struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    /// Launches a fresh engine.
    pub async fn launch(config: &FetchConfig) -> Result<Self, BrowserError> {
        let mut builder = EngineConfig::builder()
            .request_timeout(config.timeout())
            .args(launch_args(config));
        if config.disable_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = resolve_executable(config, std::env::var("CHROME_BIN").ok()) {
            builder = builder.chrome_executable(executable);
        }
        let engine_config = builder.build().map_err(BrowserError::EngineLaunch)?;

        let (browser, mut handler) = Browser::launch(engine_config)
            .await
            .map_err(|e| BrowserError::EngineLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("Engine handler loop exited");
        });

        debug!("Engine launched");
        Ok(Self { browser, handler })
    }

    /// Opens a blank page carrying `profile`'s identity and any extra headers.
    pub async fn new_page(
        &self,
        profile: &BrowserProfile,
        extra_headers: &[(&str, &str)],
    ) -> Result<Page, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::EngineLaunch(format!("failed to open page: {e}")))?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(profile.user_agent)
            .accept_language(profile.accept_language)
            .build()
            .map_err(BrowserError::EngineLaunch)?;
        page.execute(user_agent)
            .await
            .map_err(|e| BrowserError::EngineLaunch(format!("failed to set user agent: {e}")))?;

        if !extra_headers.is_empty() {
            let headers: serde_json::Map<String, Value> = extra_headers
                .iter()
                .map(|(name, value)| ((*name).to_string(), Value::from(*value)))
                .collect();
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(Value::Object(headers))))
                .await
                .map_err(|e| BrowserError::EngineLaunch(format!("failed to set headers: {e}")))?;
        }

        debug!(profile = profile.name, "Page opened");
        Ok(page)
    }

    /// Shuts the engine down and waits for the process to exit.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Engine close failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Waiting for engine exit failed");
        }
        self.handler.abort();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
