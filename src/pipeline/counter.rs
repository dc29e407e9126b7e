// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{Html, Selector};

use crate::config::settings::ScraperSettings;
use crate::domain::models::query::Query;
use crate::events::EventBus;
use crate::pipeline::PipelineError;
use crate::session::{resolve_challenge, Session};
use crate::site::{self, selectors};

/// 获取查询的总结果数
///
/// 导航到列表根页并处理验证码后，先检查“无结果”标记：存在则直接
/// 返回0，避免在一个永远不会出现的计数元素上无限等待。否则等待
/// 计数元素并解析其文本的首个整数词。计数元素在等待预算内未出现
/// 对整次运行是致命的。
pub async fn count<S: Session + ?Sized>(
    session: &S,
    bus: &EventBus,
    settings: &ScraperSettings,
    query: &Query,
) -> Result<u64, PipelineError> {
    let url = site::listing_root(&settings.base_url, query);
    session.navigate(&url).await?;
    resolve_challenge(session, bus).await;

    let html = session.content().await?;
    if has_no_results_marker(&html) {
        return Ok(0);
    }

    if !session
        .wait_for(selectors::RESULT_COUNT, settings.count_timeout())
        .await?
    {
        return Err(PipelineError::CountUnavailable);
    }

    let html = session.content().await?;
    parse_count(&html)
}

fn has_no_results_marker(html: &str) -> bool {
    let document = Html::parse_document(html);
    match Selector::parse(selectors::NO_RESULTS) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// 从页面HTML解析总结果数
pub(crate) fn parse_count(html: &str) -> Result<u64, PipelineError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(selectors::RESULT_COUNT)
        .map_err(|e| PipelineError::CountParseFailed(e.to_string()))?;

    let element = document
        .select(&selector)
        .next()
        .ok_or(PipelineError::CountUnavailable)?;

    let text = element.text().collect::<String>();
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| PipelineError::CountParseFailed("count element is empty".to_string()))?;

    token
        .parse()
        .map_err(|_| PipelineError::CountParseFailed(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_takes_leading_token() {
        let html = r#"<html><body>
            <span class="mainCountTitle">45 sonuç bulundu</span>
        </body></html>"#;
        assert_eq!(parse_count(html).unwrap(), 45);
    }

    #[test]
    fn test_parse_count_missing_element_is_unavailable() {
        let err = parse_count("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, PipelineError::CountUnavailable));
    }

    #[test]
    fn test_parse_count_non_numeric_token_fails() {
        let html = r#"<span class="mainCountTitle">çok sonuç</span>"#;
        let err = parse_count(html).unwrap_err();
        assert!(matches!(err, PipelineError::CountParseFailed(_)));
    }

    #[test]
    fn test_no_results_marker_detection() {
        let html = r#"<div class="NoResultsContainer">Sonuç bulunamadı</div>"#;
        assert!(has_no_results_marker(html));
        assert!(!has_no_results_marker("<div>45 results</div>"));
    }
}
