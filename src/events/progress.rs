// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::site::SortOrder;

/// 事件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Success,
    Error,
    Info,
}

/// 事件代码
///
/// 与对外JSON契约一一对应，序列化为 SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCode {
    BrowserInitiated,
    BrowserInitiationFailed,
    BrowserClosed,
    BrowserClosingFailed,
    RecaptchaFound,
    RecaptchaSolved,
    RecaptchaSolvingFailed,
    ProxyAuthenticationSucceed,
    ProxyAuthenticationFailed,
    TotalResultsCount,
    NoResultsFound,
    IndividualLinksPageScraped,
    IndividualLinksPageScrapingFailed,
    IndividualEntityScraped,
    IndividualEntityScrapingFailed,
    InvalidRequest,
    ScrapeFailed,
}

/// 进度事件
///
/// 无状态、fire-and-forget，仅按发出时间排序。
/// 同一结构也用作HTTP错误/提示响应体。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 事件类别
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// 事件代码
    pub code: EventCode,
    /// 自由格式负载
    pub payload: Value,
}

impl ProgressEvent {
    fn message(kind: EventKind, code: EventCode, message: &str) -> Self {
        Self {
            kind,
            code,
            payload: json!({ "message": message }),
        }
    }

    pub fn browser_initiated() -> Self {
        Self::message(
            EventKind::Success,
            EventCode::BrowserInitiated,
            "Browser initiated",
        )
    }

    pub fn browser_initiation_failed() -> Self {
        Self::message(
            EventKind::Error,
            EventCode::BrowserInitiationFailed,
            "Browser initiation failed",
        )
    }

    pub fn browser_closed() -> Self {
        Self::message(EventKind::Success, EventCode::BrowserClosed, "Browser closed")
    }

    pub fn browser_closing_failed() -> Self {
        Self::message(
            EventKind::Error,
            EventCode::BrowserClosingFailed,
            "Browser closing failed",
        )
    }

    pub fn recaptcha_found() -> Self {
        Self::message(EventKind::Info, EventCode::RecaptchaFound, "Recaptcha found")
    }

    pub fn recaptcha_solved() -> Self {
        Self::message(
            EventKind::Success,
            EventCode::RecaptchaSolved,
            "Recaptcha solved",
        )
    }

    pub fn recaptcha_solving_failed() -> Self {
        Self::message(
            EventKind::Error,
            EventCode::RecaptchaSolvingFailed,
            "Recaptcha solving failed",
        )
    }

    pub fn proxy_authentication_succeed() -> Self {
        Self::message(
            EventKind::Success,
            EventCode::ProxyAuthenticationSucceed,
            "Proxy authentication succeed",
        )
    }

    pub fn proxy_authentication_failed() -> Self {
        Self::message(
            EventKind::Error,
            EventCode::ProxyAuthenticationFailed,
            "Proxy authentication failed",
        )
    }

    pub fn total_results_count(count: u64, estimated_loss: i64) -> Self {
        Self {
            kind: EventKind::Success,
            code: EventCode::TotalResultsCount,
            payload: json!({
                "message": "Total results count",
                "totalResultsCount": count,
                "estimatedLoss": estimated_loss,
            }),
        }
    }

    pub fn no_results_found() -> Self {
        Self::message(EventKind::Info, EventCode::NoResultsFound, "No results found")
    }

    pub fn links_page_scraped(page_index: u32, link_count: usize, order: SortOrder) -> Self {
        Self {
            kind: EventKind::Success,
            code: EventCode::IndividualLinksPageScraped,
            payload: json!({
                "message": "One links page scraped",
                "pageIndex": page_index,
                "linkCount": link_count,
                "order": order.param(),
            }),
        }
    }

    pub fn links_page_scraping_failed(page_index: u32, order: SortOrder) -> Self {
        Self {
            kind: EventKind::Error,
            code: EventCode::IndividualLinksPageScrapingFailed,
            payload: json!({
                "message": "One links page scraping failed",
                "pageIndex": page_index,
                "order": order.param(),
            }),
        }
    }

    pub fn entity_scraped(link: &str) -> Self {
        Self {
            kind: EventKind::Success,
            code: EventCode::IndividualEntityScraped,
            payload: json!({
                "message": "One entity scraped",
                "link": link,
            }),
        }
    }

    pub fn entity_scraping_failed(link: &str, reason: &str) -> Self {
        Self {
            kind: EventKind::Error,
            code: EventCode::IndividualEntityScrapingFailed,
            payload: json!({
                "message": "One entity scraping failed",
                "link": link,
                "reason": reason,
            }),
        }
    }

    pub fn invalid_request() -> Self {
        Self::message(
            EventKind::Error,
            EventCode::InvalidRequest,
            "Missing category, district or city parameter",
        )
    }

    pub fn scrape_failed(reason: &str) -> Self {
        Self::message(EventKind::Error, EventCode::ScrapeFailed, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = ProgressEvent::browser_initiated();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "success");
        assert_eq!(value["code"], "BROWSER_INITIATED");
        assert_eq!(value["payload"]["message"], "Browser initiated");
    }

    #[test]
    fn test_codes_render_screaming_snake_case() {
        let value =
            serde_json::to_value(ProgressEvent::links_page_scraping_failed(3, SortOrder::ZtoA))
                .unwrap();
        assert_eq!(value["code"], "INDIVIDUAL_LINKS_PAGE_SCRAPING_FAILED");
        assert_eq!(value["type"], "error");
        assert_eq!(value["payload"]["pageIndex"], 3);
        assert_eq!(value["payload"]["order"], "ZtoA");
    }

    #[test]
    fn test_total_results_count_carries_loss() {
        let value = serde_json::to_value(ProgressEvent::total_results_count(500, 600)).unwrap();
        assert_eq!(value["payload"]["totalResultsCount"], 500);
        assert_eq!(value["payload"]["estimatedLoss"], 600);
    }
}
