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

use scraper::{ElementRef, Html, Selector};
use uuid::Uuid;

use crate::config::settings::ScraperSettings;
use crate::domain::models::entity::Entity;
use crate::events::{EventBus, ProgressEvent};
use crate::session::{resolve_challenge, Session};
use crate::site::selectors;
use crate::utils::delay::DelayPolicy;

/// 单个实体的抽取失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFailure {
    /// 失败的详情页链接
    pub link: String,
    /// 失败原因
    pub reason: String,
}

/// 依次抽取每个详情链接的实体
///
/// 失败按实体包含：每个链接恰好产生一个成功或失败的结果项和
/// 一个对应的进度事件，批次不会因单个实体中止。每次抽取后
/// 插入一次随机延迟以控制请求节奏。
pub async fn extract_all<S: Session + ?Sized>(
    session: &S,
    bus: &EventBus,
    settings: &ScraperSettings,
    delay: &DelayPolicy,
    links: &[String],
) -> Vec<Result<Entity, ExtractFailure>> {
    let mut results = Vec::with_capacity(links.len());

    for link in links {
        let outcome = extract_one(session, bus, settings, link).await;
        match &outcome {
            Ok(entity) => {
                tracing::debug!(link = link.as_str(), id = entity.id.as_str(), "entity scraped");
                bus.emit(ProgressEvent::entity_scraped(link));
            }
            Err(failure) => {
                tracing::warn!(
                    link = link.as_str(),
                    "entity scraping failed: {}",
                    failure.reason
                );
                bus.emit(ProgressEvent::entity_scraping_failed(link, &failure.reason));
            }
        }
        results.push(outcome);
        delay.pause().await;
    }

    results
}

async fn extract_one<S: Session + ?Sized>(
    session: &S,
    bus: &EventBus,
    settings: &ScraperSettings,
    link: &str,
) -> Result<Entity, ExtractFailure> {
    let failure = |reason: String| ExtractFailure {
        link: link.to_string(),
        reason,
    };

    session
        .navigate(link)
        .await
        .map_err(|e| failure(e.to_string()))?;
    resolve_challenge(session, bus).await;

    let appeared = session
        .wait_for(selectors::COMPANY_NAME, settings.detail_timeout())
        .await
        .map_err(|e| failure(e.to_string()))?;
    if !appeared {
        return Err(failure("company name element did not appear".to_string()));
    }

    let html = session
        .content()
        .await
        .map_err(|e| failure(e.to_string()))?;

    parse_entity(&html).map_err(failure)
}

/// 从详情页HTML解析实体字段
///
/// 公司名称是硬性要求；其余字段缺失时为 `None`。网站与邮箱
/// 经过格式合理性检查，不通过则置空。
pub(crate) fn parse_entity(html: &str) -> Result<Entity, String> {
    let document = Html::parse_document(html);

    let company_name = select_text(&document, selectors::COMPANY_NAME);
    if company_name.is_none() {
        return Err("company name not found".to_string());
    }

    // Only the first address line is meaningful; the rest is map boilerplate.
    let address = select_text(&document, selectors::ADDRESS)
        .and_then(|a| a.lines().next().map(|line| line.trim().to_string()))
        .filter(|a| !a.is_empty());

    let website_link =
        select_text(&document, selectors::WEBSITE).filter(|w| w.contains("http"));
    let email = select_text(&document, selectors::EMAIL).filter(|e| e.contains('@'));

    Ok(Entity {
        id: Uuid::new_v4().to_string(),
        company_name,
        professions: select_text(&document, selectors::PROFESSIONS),
        address,
        primary_phone: select_text(&document, selectors::PRIMARY_PHONE),
        secondary_phone: select_text(&document, selectors::SECONDARY_PHONE),
        website_link,
        email,
        instagram: icon_anchor_href(&document, selectors::INSTAGRAM_ICON),
        facebook: icon_anchor_href(&document, selectors::FACEBOOK_ICON),
        map_link: select_attr(&document, selectors::MAP_LINK, "href"),
    })
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
}

// Social links are anchors wrapping an icon element; find the icon and walk
// up to the enclosing <a>.
fn icon_anchor_href(document: &Html, icon_selector: &str) -> Option<String> {
    let selector = Selector::parse(icon_selector).ok()?;
    let icon = document.select(&selector).next()?;
    icon.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "a")
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}
