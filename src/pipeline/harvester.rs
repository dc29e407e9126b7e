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

use scraper::{Html, Selector};
use url::Url;

use crate::config::settings::ScraperSettings;
use crate::domain::models::query::Query;
use crate::events::{EventBus, ProgressEvent};
use crate::session::{resolve_challenge, Session};
use crate::site::{self, selectors, SortOrder};
use crate::utils::delay::DelayPolicy;

/// 按给定顺序采集 `page_count` 个列表页的详情链接
///
/// 每次导航前插入一次随机延迟。单页失败（结果容器未出现等）
/// 通过独立的失败事件上报，该页贡献零条链接，采集继续。
pub async fn harvest<S: Session + ?Sized>(
    session: &S,
    bus: &EventBus,
    settings: &ScraperSettings,
    delay: &DelayPolicy,
    query: &Query,
    page_count: u32,
    order: SortOrder,
) -> Vec<String> {
    let mut links = Vec::new();

    for index in 0..page_count {
        delay.pause().await;

        let url = site::listing_page(&settings.base_url, query, index, order);
        if let Err(e) = session.navigate(&url).await {
            tracing::warn!(page = index, ?order, "listing navigation failed: {}", e);
            bus.emit(ProgressEvent::links_page_scraping_failed(index, order));
            continue;
        }
        resolve_challenge(session, bus).await;

        match session
            .wait_for(selectors::SEARCH_RESULTS, settings.listing_timeout())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(page = index, ?order, "results container never appeared");
                bus.emit(ProgressEvent::links_page_scraping_failed(index, order));
                continue;
            }
            Err(e) => {
                tracing::warn!(page = index, ?order, "listing wait failed: {}", e);
                bus.emit(ProgressEvent::links_page_scraping_failed(index, order));
                continue;
            }
        }

        match session.content().await {
            Ok(html) => {
                let page_links = parse_links(&html, &url);
                tracing::debug!(page = index, ?order, links = page_links.len(), "page harvested");
                bus.emit(ProgressEvent::links_page_scraped(
                    index,
                    page_links.len(),
                    order,
                ));
                links.extend(page_links);
            }
            Err(e) => {
                tracing::warn!(page = index, ?order, "listing content read failed: {}", e);
                bus.emit(ProgressEvent::links_page_scraping_failed(index, order));
            }
        }
    }

    links
}

/// 从列表页HTML解析详情页链接
///
/// 相对链接相对于当前页面URL解析为绝对URL；无法解析的跳过。
pub(crate) fn parse_links(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(selectors::RESULT_LINK) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let base = Url::parse(page_url).ok();

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| match Url::parse(href) {
            Ok(url) => Some(url.to_string()),
            Err(_) => base
                .as_ref()
                .and_then(|base| base.join(href).ok())
                .map(|url| url.to_string()),
        })
        .collect()
}
