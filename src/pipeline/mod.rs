// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::models::entity::Entity;
use crate::session::SessionError;

pub mod counter;
pub mod extractor;
pub mod harvester;
pub mod orchestrator;
pub mod planner;

pub use orchestrator::Pipeline;
pub use planner::PagePlan;

/// 流水线错误类型
///
/// 只有会话建立失败与结果计数失败会提前终止运行；
/// 按页/按实体的失败被就地包含并转为进度事件。
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 会话层错误
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    /// 结果计数元素在等待预算内未出现
    #[error("Result count element did not appear")]
    CountUnavailable,
    /// 结果计数解析失败
    #[error("Result count parse failed: {0}")]
    CountParseFailed(String),
}

/// 一次运行的最终结果
#[derive(Debug)]
pub enum RunOutcome {
    /// 抽取完成，包含部分成功的实体集合与损失估计
    Success { data: Vec<Entity>, loss: i64 },
    /// 站点报告没有匹配结果
    NoResults,
    /// 不可恢复的失败
    Failed(PipelineError),
}
