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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、抓取器、代理、验证码求解等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取器配置
    pub scraper: ScraperSettings,
    /// 代理配置（可选）
    pub proxy: Option<ProxySettings>,
    /// 验证码求解服务配置（可选）
    pub captcha: Option<CaptchaSettings>,
    /// CORS允许的来源（可选）
    pub cors_origin: Option<String>,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 目标站点搜索根URL
    pub base_url: String,
    /// 每个列表页的最大条目数
    pub per_page_limit: u32,
    /// 单次查询可返回的实体上限
    pub display_limit: u32,
    /// 等待结果计数元素的超时时间（秒）
    pub count_timeout_secs: u64,
    /// 等待列表页结果容器的超时时间（秒）
    pub listing_timeout_secs: u64,
    /// 等待详情页主名称元素的超时时间（秒）
    pub detail_timeout_secs: u64,
    /// 页间随机延迟下限（毫秒）
    pub min_delay_ms: u64,
    /// 页间随机延迟上限（毫秒）
    pub max_delay_ms: u64,
}

impl ScraperSettings {
    pub fn count_timeout(&self) -> Duration {
        Duration::from_secs(self.count_timeout_secs)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

/// 代理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    /// 代理服务器地址 (host:port)
    pub server: String,
    /// 代理用户名
    pub username: Option<String>,
    /// 代理密码
    pub password: Option<String>,
}

/// 验证码求解服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaSettings {
    /// 求解服务API根地址
    pub api_url: String,
    /// 求解服务API令牌
    pub api_token: String,
    /// 轮询求解结果的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 最大轮询次数
    pub max_polls: u32,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件与环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // Default scraper settings
            .set_default("scraper.base_url", "https://www.bulurum.com/search/")?
            .set_default("scraper.per_page_limit", 20)?
            .set_default("scraper.display_limit", 200)?
            .set_default("scraper.count_timeout_secs", 60)?
            .set_default("scraper.listing_timeout_secs", 120)?
            .set_default("scraper.detail_timeout_secs", 60)?
            .set_default("scraper.min_delay_ms", 1000)?
            .set_default("scraper.max_delay_ms", 2000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DIRSCRAPE").separator("__"));

        builder.build()?.try_deserialize()
    }
}
