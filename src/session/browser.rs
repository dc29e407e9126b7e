// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::fetch::{
    AuthChallengeResponse, AuthChallengeResponseResponse, ContinueRequestParams,
    ContinueWithAuthParams, EnableParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::settings::{ProxySettings, Settings};
use crate::events::{EventBus, ProgressEvent};
use crate::session::captcha::CaptchaSolver;
use crate::session::{Session, SessionError};
use crate::site::selectors;

// Poll interval for wait_for selector checks.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 浏览会话
///
/// 基于 chromiumoxide 的单次运行浏览器会话。持有一个浏览器进程
/// 与其中唯一的页面；代理凭据与验证码处理都属于会话。
pub struct BrowsingSession {
    browser: Mutex<Browser>,
    page: Page,
    solver: Option<CaptchaSolver>,
}

impl BrowsingSession {
    /// 打开新的浏览会话
    ///
    /// 固定1920x1080视口，为容器化执行禁用沙箱；配置了代理时，
    /// 在第一次导航之前安装逐请求的代理认证应答。
    ///
    /// # 参数
    ///
    /// * `settings` - 应用配置
    /// * `bus` - 进度事件总线（代理认证结果经由它上报）
    pub async fn open(settings: &Settings, bus: &EventBus) -> Result<Self, SessionError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .args(vec![
                "--disable-setuid-sandbox",
                "--disable-gpu",
                "--disable-dev-shm-usage",
            ]);

        if let Some(proxy) = &settings.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy.server));
        }

        let config = builder.build().map_err(SessionError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        // Drive the CDP connection until it terminates.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        if let Some(proxy) = &settings.proxy {
            if proxy.username.is_some() {
                match install_proxy_auth(&page, proxy).await {
                    Ok(()) => bus.emit(ProgressEvent::proxy_authentication_succeed()),
                    Err(e) => {
                        bus.emit(ProgressEvent::proxy_authentication_failed());
                        return Err(e);
                    }
                }
            }
        }

        let solver = settings.captcha.as_ref().map(CaptchaSolver::new);

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            solver,
        })
    }
}

/// 安装代理认证应答
///
/// 通过CDP Fetch域拦截认证质询并以配置的凭据应答；
/// 启用拦截后每个请求都会暂停，必须逐个放行。
async fn install_proxy_auth(page: &Page, proxy: &ProxySettings) -> Result<(), SessionError> {
    let username = proxy.username.clone();
    let password = proxy.password.clone();

    page.execute(EnableParams {
        handle_auth_requests: Some(true),
        ..Default::default()
    })
    .await
    .map_err(|e| SessionError::ProxyAuthFailed(e.to_string()))?;

    let mut auth_required = page
        .event_listener::<chromiumoxide::cdp::browser_protocol::fetch::EventAuthRequired>()
        .await
        .map_err(|e| SessionError::ProxyAuthFailed(e.to_string()))?;
    let mut request_paused = page
        .event_listener::<chromiumoxide::cdp::browser_protocol::fetch::EventRequestPaused>()
        .await
        .map_err(|e| SessionError::ProxyAuthFailed(e.to_string()))?;

    let auth_page = page.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(event) = auth_required.next() => {
                    let response = AuthChallengeResponse {
                        response: AuthChallengeResponseResponse::ProvideCredentials,
                        username: username.clone(),
                        password: password.clone(),
                    };
                    let command =
                        ContinueWithAuthParams::new(event.request_id.clone(), response);
                    if auth_page.execute(command).await.is_err() {
                        break;
                    }
                }
                Some(event) = request_paused.next() => {
                    let command = ContinueRequestParams::new(event.request_id.clone());
                    if auth_page.execute(command).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    Ok(())
}

#[async_trait]
impl Session for BrowsingSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::NavigationFailed(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| SessionError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError> {
        let appeared = tokio::time::timeout(timeout, async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            }
        })
        .await;

        Ok(appeared.is_ok())
    }

    async fn content(&self) -> Result<String, SessionError> {
        self.page
            .content()
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))
    }

    async fn detect_challenge(&self) -> Result<bool, SessionError> {
        Ok(self
            .page
            .find_element(selectors::CAPTCHA_CONTAINER)
            .await
            .is_ok())
    }

    async fn solve_challenge(&self) -> Result<(), SessionError> {
        let solver = self.solver.as_ref().ok_or(SessionError::SolverUnavailable)?;

        let sitekey: Option<String> = self
            .page
            .evaluate(
                "document.querySelector('.g-recaptcha')?.getAttribute('data-sitekey') ?? null",
            )
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?
            .into_value()
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;
        let sitekey = sitekey.ok_or_else(|| {
            SessionError::SolvingFailed("captcha sitekey not found on page".to_string())
        })?;

        let page_url = self
            .page
            .url()
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?
            .unwrap_or_default();

        let token = solver.solve(&sitekey, &page_url).await?;

        // Surface the token the way the widget would, then let the page react.
        let script = format!(
            "(() => {{ const el = document.querySelector('#g-recaptcha-response'); \
             if (el) {{ el.style.display = ''; el.value = '{}'; \
             el.dispatchEvent(new Event('change')); }} }})()",
            token
        );
        self.page
            .evaluate(script)
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;

        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| SessionError::CloseFailed(e.to_string()))
    }
}
