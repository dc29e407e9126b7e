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

use axum::{
    extract::{Extension, Query as QueryParams},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;
use crate::domain::models::query::Query;
use crate::events::{EventBus, ProgressEvent};
use crate::pipeline::{Pipeline, PipelineError, RunOutcome};
use crate::session::SessionError;

/// 查询请求参数
#[derive(Debug, Deserialize)]
pub struct QueryRequestDto {
    /// 实体类别
    pub category: Option<String>,
    /// 区名
    pub district: Option<String>,
    /// 城市名
    pub city: Option<String>,
}

/// 目录查询端点
///
/// 缺少任一参数时返回结构化的无效请求消息且不启动运行；
/// 否则同步执行一次完整的流水线运行并返回最终负载。
pub async fn query(
    Extension(settings): Extension<Arc<Settings>>,
    Extension(bus): Extension<EventBus>,
    QueryParams(params): QueryParams<QueryRequestDto>,
) -> impl IntoResponse {
    let (Some(category), Some(district), Some(city)) =
        (params.category, params.district, params.city)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::to_value(ProgressEvent::invalid_request()).unwrap_or_default()),
        );
    };

    info!(
        category = category.as_str(),
        district = district.as_str(),
        city = city.as_str(),
        "query received"
    );

    let query = Query::new(category, district, city);
    let pipeline = Pipeline::new(settings, bus);

    match pipeline.run(&query).await {
        RunOutcome::Success { data, loss } => (
            StatusCode::OK,
            Json(serde_json::json!({
                "type": "success",
                "payload": {
                    "data": data,
                    "loss": loss,
                },
            })),
        ),
        RunOutcome::NoResults => (
            StatusCode::OK,
            Json(serde_json::to_value(ProgressEvent::no_results_found()).unwrap_or_default()),
        ),
        RunOutcome::Failed(PipelineError::Session(SessionError::LaunchFailed(_))) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(
                serde_json::to_value(ProgressEvent::browser_initiation_failed())
                    .unwrap_or_default(),
            ),
        ),
        RunOutcome::Failed(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(
                serde_json::to_value(ProgressEvent::scrape_failed(&e.to_string()))
                    .unwrap_or_default(),
            ),
        ),
    }
}
