// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::domain::models::query::Query;
use crate::events::{EventBus, ProgressEvent};
use crate::pipeline::{counter, extractor, harvester, PagePlan, RunOutcome};
use crate::session::{BrowsingSession, Session};
use crate::site::SortOrder;
use crate::utils::delay::DelayPolicy;

/// 流水线编排器
///
/// 按固定顺序串联计数、规划、采集与抽取，并负责会话的建立与
/// 无条件关闭。线性状态流，无回边：
/// 会话建立 → 计数 → (无结果 | 规划) → 正序采集 → [逆序采集]
/// → 抽取 → 会话关闭。重复调用同一查询总是开启全新会话，
/// 不做任何跨运行缓存。
pub struct Pipeline {
    settings: Arc<Settings>,
    bus: EventBus,
    delay: DelayPolicy,
}

impl Pipeline {
    pub fn new(settings: Arc<Settings>, bus: EventBus) -> Self {
        let delay = DelayPolicy::uniform(
            settings.scraper.min_delay_ms,
            settings.scraper.max_delay_ms,
        );
        Self {
            settings,
            bus,
            delay,
        }
    }

    /// 覆盖延迟策略（测试用零延迟）
    pub fn with_delay_policy(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    /// 执行一次完整运行
    ///
    /// 会话的打开/关闭事件在这里发出；一旦会话打开成功，
    /// 无论后续结果如何都会执行关闭步骤。
    pub async fn run(&self, query: &Query) -> RunOutcome {
        let session = match BrowsingSession::open(&self.settings, &self.bus).await {
            Ok(session) => {
                self.bus.emit(ProgressEvent::browser_initiated());
                session
            }
            Err(e) => {
                tracing::error!("browser initiation failed: {}", e);
                self.bus.emit(ProgressEvent::browser_initiation_failed());
                return RunOutcome::Failed(e.into());
            }
        };

        let outcome = self.run_with_session(&session, query).await;

        match session.close().await {
            Ok(()) => self.bus.emit(ProgressEvent::browser_closed()),
            Err(e) => {
                // Teardown failure is reported but does not change the result.
                tracing::warn!("browser closing failed: {}", e);
                self.bus.emit(ProgressEvent::browser_closing_failed());
            }
        }

        outcome
    }

    /// 在给定会话上执行流水线主体
    ///
    /// 与会话建立解耦，便于以脚本化会话驱动端到端测试
    pub async fn run_with_session<S: Session + ?Sized>(
        &self,
        session: &S,
        query: &Query,
    ) -> RunOutcome {
        let scraper = &self.settings.scraper;

        let result_count = match counter::count(session, &self.bus, scraper, query).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("result counting failed: {}", e);
                self.bus.emit(ProgressEvent::scrape_failed(&e.to_string()));
                return RunOutcome::Failed(e);
            }
        };

        let plan = PagePlan::new(result_count, scraper.per_page_limit, scraper.display_limit);
        tracing::info!(
            count = result_count,
            forward = plan.forward_pages,
            backward = plan.backward_pages,
            loss = plan.loss(),
            "page plan computed"
        );
        self.bus
            .emit(ProgressEvent::total_results_count(result_count, plan.loss()));

        if result_count == 0 {
            self.bus.emit(ProgressEvent::no_results_found());
            return RunOutcome::NoResults;
        }

        let forward = harvester::harvest(
            session,
            &self.bus,
            scraper,
            &self.delay,
            query,
            plan.forward_pages,
            SortOrder::AtoZ,
        )
        .await;

        let backward = if plan.backward_pages > 0 {
            harvester::harvest(
                session,
                &self.bus,
                scraper,
                &self.delay,
                query,
                plan.backward_pages,
                SortOrder::ZtoA,
            )
            .await
        } else {
            Vec::new()
        };

        let links = plan.merge(forward, backward);
        tracing::info!(links = links.len(), "link harvest complete, extracting");

        let results =
            extractor::extract_all(session, &self.bus, scraper, &self.delay, &links).await;
        let data = results.into_iter().filter_map(Result::ok).collect();

        RunOutcome::Success {
            data,
            loss: plan.loss(),
        }
    }
}
