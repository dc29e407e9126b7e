// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::events::{EventBus, ProgressEvent};

pub mod browser;
pub mod captcha;

pub use browser::BrowsingSession;
pub use captcha::CaptchaSolver;

/// 会话错误类型
#[derive(Error, Debug)]
pub enum SessionError {
    /// 浏览器启动失败
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),
    /// 页面求值/读取失败
    #[error("Page evaluation failed: {0}")]
    EvaluationFailed(String),
    /// 代理认证安装失败
    #[error("Proxy authentication failed: {0}")]
    ProxyAuthFailed(String),
    /// 未配置验证码求解服务
    #[error("Captcha solver is not configured")]
    SolverUnavailable,
    /// 验证码求解失败
    #[error("Captcha solving failed: {0}")]
    SolvingFailed(String),
    /// 浏览器关闭失败
    #[error("Browser close failed: {0}")]
    CloseFailed(String),
}

/// 浏览会话特质
///
/// 流水线各阶段共享的页面级操作接口。每次运行恰好持有一个会话，
/// 运行结束后无条件关闭，不跨运行复用。
#[async_trait]
pub trait Session: Send + Sync {
    /// 导航到指定URL并等待加载完成
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// 等待选择器出现
    ///
    /// # 返回值
    ///
    /// 超时前出现返回 `Ok(true)`，超时返回 `Ok(false)`；
    /// 是否致命由调用方决定
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError>;

    /// 读取当前页面HTML
    async fn content(&self) -> Result<String, SessionError>;

    /// 探测验证码容器是否存在
    async fn detect_challenge(&self) -> Result<bool, SessionError>;

    /// 调用外部服务求解验证码
    async fn solve_challenge(&self) -> Result<(), SessionError>;

    /// 关闭会话
    async fn close(&self) -> Result<(), SessionError>;
}

/// 探测并处理当前页面的验证码
///
/// 求解失败是非致命的：仅记录并上报，由后续的选择器等待
/// 自行失败并按页/按实体处理。
pub async fn resolve_challenge<S: Session + ?Sized>(session: &S, bus: &EventBus) {
    match session.detect_challenge().await {
        Ok(true) => {
            tracing::info!("captcha challenge detected");
            bus.emit(ProgressEvent::recaptcha_found());
            match session.solve_challenge().await {
                Ok(()) => bus.emit(ProgressEvent::recaptcha_solved()),
                Err(e) => {
                    tracing::warn!("captcha solving failed: {}", e);
                    bus.emit(ProgressEvent::recaptcha_solving_failed());
                }
            }
        }
        Ok(false) => {}
        Err(e) => tracing::warn!("captcha detection failed: {}", e),
    }
}
