//! Browser configuration and the CDP-backed driver.
//!
//! The core is synchronous; real browser control is an implementation
//! detail of one [`Driver`](crate::driver::Driver) implementation. When
//! compiled with the `browser` feature, [`cdp::CdpDriver`] drives a
//! Chromium instance over the Chrome DevTools Protocol via chromiumoxide,
//! owning a dedicated tokio runtime and blocking on each call. Without the
//! feature, tests run against [`crate::mock::MockDriver`].

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Remote debugging port (0 = auto-assign)
    pub debug_port: u16,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 900,
            chromium_path: None,
            debug_port: 0,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::wildcard_imports, clippy::cast_possible_truncation)]
pub mod cdp {
    use super::BrowserConfig;
    use crate::driver::{ConsoleEntry, ConsoleLevel, Cookie, Driver};
    use crate::locator::Locator;
    use crate::result::{NavegarError, NavegarResult};

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use base64::Engine;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::{ConsoleApiCalledType, EventConsoleApiCalled};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::runtime::Runtime;

    fn driver_err(e: impl std::fmt::Display) -> NavegarError {
        NavegarError::driver(e.to_string())
    }

    /// Synchronous driver over a live Chromium session.
    ///
    /// Owns its tokio runtime; every trait call blocks on the underlying
    /// CDP future, which keeps the engine's strictly sequential model
    /// intact while the async stack stays private to this type.
    pub struct CdpDriver {
        config: BrowserConfig,
        runtime: Runtime,
        browser: Option<CdpBrowser>,
        page: CdpPage,
        console: Arc<Mutex<Vec<ConsoleEntry>>>,
        cursor: (i64, i64),
        #[allow(dead_code)]
        handler_task: tokio::task::JoinHandle<()>,
        #[allow(dead_code)]
        console_task: tokio::task::JoinHandle<()>,
    }

    impl std::fmt::Debug for CdpDriver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("CdpDriver")
                .field("config", &self.config)
                .field("cursor", &self.cursor)
                .finish_non_exhaustive()
        }
    }

    impl CdpDriver {
        /// Launch a Chromium instance and open a blank page.
        pub fn launch(config: BrowserConfig) -> NavegarResult<Self> {
            let runtime = Runtime::new()?;
            let console: Arc<Mutex<Vec<ConsoleEntry>>> = Arc::new(Mutex::new(Vec::new()));

            let (browser, page, handler_task, console_task) = runtime.block_on(async {
                let mut builder = CdpConfig::builder()
                    .window_size(config.viewport_width, config.viewport_height);

                if !config.headless {
                    builder = builder.with_head();
                }
                if !config.sandbox {
                    builder = builder.no_sandbox();
                }
                if let Some(ref path) = config.chromium_path {
                    builder = builder.chrome_executable(path);
                }

                let cdp_config = builder.build().map_err(|e| NavegarError::BrowserLaunch {
                    message: e.to_string(),
                })?;

                let (browser, mut handler) =
                    CdpBrowser::launch(cdp_config)
                        .await
                        .map_err(|e| NavegarError::BrowserLaunch {
                            message: e.to_string(),
                        })?;

                let handler_task = tokio::spawn(async move {
                    while let Some(h) = handler.next().await {
                        if h.is_err() {
                            break;
                        }
                    }
                });

                let page = browser
                    .new_page("about:blank")
                    .await
                    .map_err(driver_err)?;

                if let Some(ref ua) = config.user_agent {
                    page.set_user_agent(ua.as_str()).await.map_err(driver_err)?;
                }

                let mut events = page
                    .event_listener::<EventConsoleApiCalled>()
                    .await
                    .map_err(driver_err)?;
                let sink = Arc::clone(&console);
                let console_task = tokio::spawn(async move {
                    while let Some(event) = events.next().await {
                        let level = match event.r#type {
                            ConsoleApiCalledType::Error => ConsoleLevel::Error,
                            ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
                            ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
                            _ => ConsoleLevel::Info,
                        };
                        let text = event
                            .args
                            .iter()
                            .filter_map(|arg| arg.value.as_ref())
                            .map(std::string::ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(" ");
                        if let Ok(mut buffer) = sink.lock() {
                            buffer.push(ConsoleEntry::new(level, text));
                        }
                    }
                });

                Ok::<_, NavegarError>((browser, page, handler_task, console_task))
            })?;

            let cursor = (
                i64::from(config.viewport_width) / 2,
                i64::from(config.viewport_height) / 2,
            );

            Ok(Self {
                config,
                runtime,
                browser: Some(browser),
                page,
                console,
                cursor,
                handler_task,
                console_task,
            })
        }

        /// The configuration the session was launched with
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        fn eval(&self, script: &str) -> NavegarResult<serde_json::Value> {
            self.runtime.block_on(async {
                let result = self.page.evaluate(script).await.map_err(driver_err)?;
                Ok(result
                    .value()
                    .cloned()
                    .unwrap_or(serde_json::Value::Null))
            })
        }

        /// Evaluate a script that acts on a located element; `false` means
        /// the element was not found.
        fn eval_on_element(&self, locator: &Locator, body: &str) -> NavegarResult<()> {
            let script = format!(
                "(function() {{ const el = {}; if (!el) return false; {}; return true; }})()",
                locator.to_query(),
                body
            );
            if self.eval(&script)?.as_bool().unwrap_or(false) {
                Ok(())
            } else {
                Err(NavegarError::ElementMissing {
                    locator: locator.to_string(),
                })
            }
        }
    }

    impl Driver for CdpDriver {
        fn goto(&mut self, url: &str) -> NavegarResult<()> {
            self.runtime.block_on(async {
                self.page.goto(url).await.map_err(driver_err)?;
                Ok(())
            })
        }

        fn current_url(&self) -> NavegarResult<String> {
            self.runtime.block_on(async {
                Ok(self
                    .page
                    .url()
                    .await
                    .map_err(driver_err)?
                    .unwrap_or_else(|| "about:blank".to_string()))
            })
        }

        fn title(&self) -> NavegarResult<String> {
            self.runtime.block_on(async {
                Ok(self
                    .page
                    .get_title()
                    .await
                    .map_err(driver_err)?
                    .unwrap_or_default())
            })
        }

        fn is_present(&self, locator: &Locator) -> NavegarResult<bool> {
            Ok(self
                .eval(&locator.to_visible_query())?
                .as_bool()
                .unwrap_or(false))
        }

        fn click(&mut self, locator: &Locator) -> NavegarResult<()> {
            self.eval_on_element(locator, "el.click()")
        }

        fn hover(&mut self, locator: &Locator) -> NavegarResult<()> {
            self.eval_on_element(
                locator,
                "el.dispatchEvent(new MouseEvent('mouseover', { bubbles: true }))",
            )
        }

        fn type_text(&mut self, locator: &Locator, text: &str) -> NavegarResult<()> {
            let body = format!(
                "el.focus(); el.value = (el.value || '') + {}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }}))",
                serde_json::Value::String(text.to_string())
            );
            self.eval_on_element(locator, &body)
        }

        fn clear(&mut self, locator: &Locator) -> NavegarResult<()> {
            self.eval_on_element(
                locator,
                "el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true }))",
            )
        }

        fn element_value(&self, locator: &Locator) -> NavegarResult<String> {
            let script = format!(
                "(function() {{ const el = {}; return el ? String(el.value || '') : null; }})()",
                locator.to_query()
            );
            match self.eval(&script)? {
                serde_json::Value::String(value) => Ok(value),
                _ => Err(NavegarError::ElementMissing {
                    locator: locator.to_string(),
                }),
            }
        }

        fn submit(&mut self, locator: &Locator) -> NavegarResult<()> {
            self.eval_on_element(
                locator,
                "const form = el.form || el.closest('form'); \
                 if (form) { form.requestSubmit ? form.requestSubmit() : form.submit(); } \
                 else { el.click(); }",
            )
        }

        fn scroll_to(&mut self, x: i64, y: i64) -> NavegarResult<()> {
            self.eval(&format!("window.scrollTo({x}, {y})"))?;
            Ok(())
        }

        fn move_cursor_by(&mut self, dx: i64, dy: i64) -> NavegarResult<()> {
            let target = (self.cursor.0 + dx, self.cursor.1 + dy);
            let (width, height) = (
                i64::from(self.config.viewport_width),
                i64::from(self.config.viewport_height),
            );
            if target.0 < 0 || target.1 < 0 || target.0 >= width || target.1 >= height {
                return Err(NavegarError::OutOfViewport { dx, dy });
            }
            self.runtime.block_on(async {
                let params = DispatchMouseEventParams::builder()
                    .r#type(DispatchMouseEventType::MouseMoved)
                    .x(target.0 as f64)
                    .y(target.1 as f64)
                    .build()
                    .map_err(driver_err)?;
                self.page.execute(params).await.map_err(driver_err)?;
                Ok::<_, NavegarError>(())
            })?;
            self.cursor = target;
            Ok(())
        }

        fn execute_script(&mut self, script: &str) -> NavegarResult<serde_json::Value> {
            self.eval(script)
        }

        fn cookies(&self) -> NavegarResult<Vec<Cookie>> {
            self.runtime.block_on(async {
                let cookies = self.page.get_cookies().await.map_err(driver_err)?;
                Ok(cookies
                    .into_iter()
                    .map(|c| Cookie {
                        name: c.name,
                        value: c.value,
                        domain: Some(c.domain),
                        path: Some(c.path),
                        secure: c.secure,
                    })
                    .collect())
            })
        }

        fn console_entries(&mut self) -> NavegarResult<Vec<ConsoleEntry>> {
            Ok(std::mem::take(
                &mut *self
                    .console
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
            ))
        }

        fn local_storage(&self) -> NavegarResult<HashMap<String, String>> {
            let value = self.eval(
                "(function() { const o = {}; \
                 for (let i = 0; i < localStorage.length; i++) { \
                   const k = localStorage.key(i); o[k] = localStorage.getItem(k); } \
                 return o; })()",
            )?;
            Ok(serde_json::from_value(value)?)
        }

        fn session_storage(&self) -> NavegarResult<HashMap<String, String>> {
            let value = self.eval(
                "(function() { const o = {}; \
                 for (let i = 0; i < sessionStorage.length; i++) { \
                   const k = sessionStorage.key(i); o[k] = sessionStorage.getItem(k); } \
                 return o; })()",
            )?;
            Ok(serde_json::from_value(value)?)
        }

        fn screenshot(&mut self) -> NavegarResult<Vec<u8>> {
            self.runtime.block_on(async {
                let params = CaptureScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build();
                let result = self.page.execute(params).await.map_err(driver_err)?;
                base64::engine::general_purpose::STANDARD
                    .decode(&result.data)
                    .map_err(driver_err)
            })
        }

        fn quit(&mut self) -> NavegarResult<()> {
            if let Some(mut browser) = self.browser.take() {
                self.runtime.block_on(async {
                    browser.close().await.map_err(driver_err)?;
                    Ok::<_, NavegarError>(())
                })?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.viewport_height, 900);
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = BrowserConfig::default()
            .with_viewport(1920, 1080)
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium")
            .with_user_agent("navegar-test");
        assert_eq!(config.viewport_width, 1920);
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.user_agent.as_deref(), Some("navegar-test"));
    }
}
