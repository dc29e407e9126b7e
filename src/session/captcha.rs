// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use std::time::Duration;

use crate::config::settings::CaptchaSettings;
use crate::session::SessionError;

/// 验证码求解客户端
///
/// 对接2captcha风格的外部求解服务：提交站点密钥后轮询结果。
/// 求解算法本身对本系统不透明。
pub struct CaptchaSolver {
    client: reqwest::Client,
    api_url: String,
    api_token: String,
    poll_interval: Duration,
    max_polls: u32,
}

/// 求解服务的统一响应形状（in.php 与 res.php 相同）
#[derive(Debug, Deserialize)]
struct SolverResponse {
    status: u32,
    request: String,
}

impl CaptchaSolver {
    pub fn new(settings: &CaptchaSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            max_polls: settings.max_polls,
        }
    }

    /// 求解一个reCAPTCHA
    ///
    /// # 参数
    ///
    /// * `sitekey` - 页面上的站点密钥
    /// * `page_url` - 出现验证码的页面URL
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 求解出的响应令牌
    /// * `Err(SessionError)` - 提交或轮询失败，或求解超时
    pub async fn solve(&self, sitekey: &str, page_url: &str) -> Result<String, SessionError> {
        let submit: SolverResponse = self
            .client
            .post(format!("{}/in.php", self.api_url))
            .query(&[
                ("key", self.api_token.as_str()),
                ("method", "userrecaptcha"),
                ("googlekey", sitekey),
                ("pageurl", page_url),
                ("json", "1"),
            ])
            .send()
            .await
            .map_err(|e| SessionError::SolvingFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| SessionError::SolvingFailed(e.to_string()))?;

        if submit.status != 1 {
            return Err(SessionError::SolvingFailed(submit.request));
        }
        let task_id = submit.request;

        for _ in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let poll: SolverResponse = self
                .client
                .get(format!("{}/res.php", self.api_url))
                .query(&[
                    ("key", self.api_token.as_str()),
                    ("action", "get"),
                    ("id", task_id.as_str()),
                    ("json", "1"),
                ])
                .send()
                .await
                .map_err(|e| SessionError::SolvingFailed(e.to_string()))?
                .json()
                .await
                .map_err(|e| SessionError::SolvingFailed(e.to_string()))?;

            if poll.status == 1 {
                return Ok(poll.request);
            }
            if poll.request != "CAPCHA_NOT_READY" {
                return Err(SessionError::SolvingFailed(poll.request));
            }
        }

        Err(SessionError::SolvingFailed(
            "solver polling exhausted".to_string(),
        ))
    }
}
