// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 页间延迟策略
///
/// 在导航之间插入有界的随机延迟，降低请求的突发性。
/// 作为可注入的策略存在，测试使用 [`DelayPolicy::none`] 获得确定性。
#[derive(Debug, Clone, Copy)]
pub struct DelayPolicy {
    min_ms: u64,
    max_ms: u64,
}

impl DelayPolicy {
    /// 自定义区间的延迟策略
    pub fn uniform(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    /// 零延迟策略
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// 计算下一次延迟时长，在区间内均匀采样
    pub fn next(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    /// 暂停一次随机延迟
    pub async fn pause(&self) {
        let delay = self.next();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
