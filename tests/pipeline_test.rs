// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 流水线端到端测试
//!
//! 用脚本化会话驱动完整流水线，不依赖真实浏览器。

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dirscrape::config::settings::{ScraperSettings, ServerSettings, Settings};
use dirscrape::domain::models::query::Query;
use dirscrape::events::{EventBus, EventCode};
use dirscrape::pipeline::{Pipeline, RunOutcome};
use dirscrape::session::{Session, SessionError};
use dirscrape::utils::delay::DelayPolicy;

const BASE: &str = "https://www.bulurum.com/search/";

/// 脚本化会话：按URL返回预置的HTML并记录全部导航
struct MockSession {
    pages: HashMap<String, String>,
    current: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    challenged: bool,
}

impl MockSession {
    fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages,
            current: Mutex::new(String::new()),
            navigations: Mutex::new(Vec::new()),
            challenged: false,
        }
    }

    /// 每个页面都报告验证码，且求解总是失败
    fn with_unsolvable_challenge(pages: HashMap<String, String>) -> Self {
        Self {
            challenged: true,
            ..Self::new(pages)
        }
    }

    fn visited(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.navigations.lock().unwrap().push(url.to_string());
        let html = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string());
        *self.current.lock().unwrap() = html;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool, SessionError> {
        let html = self.current.lock().unwrap().clone();
        let document = Html::parse_document(&html);
        let selector = Selector::parse(selector)
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;
        Ok(document.select(&selector).next().is_some())
    }

    async fn content(&self) -> Result<String, SessionError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn detect_challenge(&self) -> Result<bool, SessionError> {
        Ok(self.challenged)
    }

    async fn solve_challenge(&self) -> Result<(), SessionError> {
        if self.challenged {
            Err(SessionError::SolvingFailed("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }

    async fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }
}

fn settings() -> Arc<Settings> {
    Arc::new(Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        scraper: ScraperSettings {
            base_url: BASE.to_string(),
            per_page_limit: 20,
            display_limit: 200,
            count_timeout_secs: 1,
            listing_timeout_secs: 1,
            detail_timeout_secs: 1,
            min_delay_ms: 0,
            max_delay_ms: 0,
        },
        proxy: None,
        captcha: None,
        cors_origin: None,
    })
}

fn pipeline(bus: EventBus) -> Pipeline {
    Pipeline::new(settings(), bus).with_delay_policy(DelayPolicy::none())
}

fn query() -> Query {
    Query::new("veteriner", "sisli", "istanbul")
}

fn count_page(count: u64) -> String {
    format!(
        r#"<html><body><span class="mainCountTitle">{} sonuç</span></body></html>"#,
        count
    )
}

fn listing_page(links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a class="FreeListingAreaBottomRight" href="{}"></a>"#, link))
        .collect();
    format!(
        r#"<html><body><div id="SearchResults">{}</div></body></html>"#,
        anchors
    )
}

fn detail_page(name: &str) -> String {
    format!(
        r#"<html><body>
            <span id="CompanyNameLbl">{}</span>
            <span id="ProfessionLbl">Veteriner Hekim</span>
        </body></html>"#,
        name
    )
}

/// 搭建一个可走通的站点脚本
///
/// 列表页按 `per_page` 切分详情链接，首尾页都挂在正确的URL上；
/// 每个详情链接都有一张带公司名的详情页。
fn seed_listing_run(
    pages: &mut HashMap<String, String>,
    links: &[String],
    page_count: u32,
    order: dirscrape::site::SortOrder,
) {
    for index in 0..page_count {
        let start = (index as usize) * 20;
        let end = (start + 20).min(links.len());
        let chunk: &[String] = if start < links.len() {
            &links[start..end]
        } else {
            &[]
        };
        pages.insert(
            dirscrape::site::listing_page(BASE, &query(), index, order),
            listing_page(chunk),
        );
    }
    for (i, link) in links.iter().enumerate() {
        pages.insert(link.clone(), detail_page(&format!("Company {}", i)));
    }
}

#[tokio::test]
async fn test_small_result_set_runs_forward_only() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        count_page(45),
    );
    let links: Vec<String> = (0..45)
        .map(|i| format!("https://www.bulurum.com/biz/f{}", i))
        .collect();
    seed_listing_run(&mut pages, &links, 3, dirscrape::site::SortOrder::AtoZ);

    let session = MockSession::new(pages);
    let bus = EventBus::new(256);
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    let RunOutcome::Success { data, loss } = outcome else {
        panic!("expected success");
    };
    assert_eq!(data.len(), 45);
    assert_eq!(loss, 0);
    assert_eq!(data[0].company_name.as_deref(), Some("Company 0"));

    let visited = session.visited();
    assert!(
        visited.iter().all(|url| !url.contains("Order=ZtoA")),
        "small result sets must never harvest backward"
    );
    assert_eq!(
        visited
            .iter()
            .filter(|url| url.contains("Order=AtoZ"))
            .count(),
        3
    );
}

#[tokio::test]
async fn test_no_results_short_circuits() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        r#"<html><body><div class="NoResultsContainer">Sonuç bulunamadı</div></body></html>"#
            .to_string(),
    );

    let session = MockSession::new(pages);
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    assert!(matches!(outcome, RunOutcome::NoResults));
    assert_eq!(session.visited().len(), 1, "no listing or detail visits");

    let mut saw_no_results = false;
    while let Ok(event) = events.try_recv() {
        if event.code == EventCode::NoResultsFound {
            saw_no_results = true;
        }
    }
    assert!(saw_no_results);
}

#[tokio::test]
async fn test_large_result_set_harvests_both_directions() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        count_page(500),
    );

    // Two links per listing page keeps the script small; the page plan is
    // driven by the reported count, not by how full each page is.
    let forward: Vec<String> = (0..20)
        .map(|i| format!("https://www.bulurum.com/biz/f{}", i))
        .collect();
    let backward: Vec<String> = (0..20)
        .map(|i| format!("https://www.bulurum.com/biz/b{}", i))
        .collect();
    for index in 0..10u32 {
        let f = &forward[(index as usize) * 2..(index as usize) * 2 + 2];
        let b = &backward[(index as usize) * 2..(index as usize) * 2 + 2];
        pages.insert(
            dirscrape::site::listing_page(BASE, &query(), index, dirscrape::site::SortOrder::AtoZ),
            listing_page(f),
        );
        pages.insert(
            dirscrape::site::listing_page(BASE, &query(), index, dirscrape::site::SortOrder::ZtoA),
            listing_page(b),
        );
    }
    for (i, link) in forward.iter().chain(backward.iter()).enumerate() {
        pages.insert(link.clone(), detail_page(&format!("Company {}", i)));
    }

    let session = MockSession::new(pages);
    let bus = EventBus::new(256);
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    let RunOutcome::Success { data, loss } = outcome else {
        panic!("expected success");
    };
    assert_eq!(data.len(), 40);
    assert_eq!(loss, 600);

    let visited = session.visited();
    assert_eq!(
        visited
            .iter()
            .filter(|url| url.contains("Order=AtoZ"))
            .count(),
        10
    );
    assert_eq!(
        visited
            .iter()
            .filter(|url| url.contains("Order=ZtoA"))
            .count(),
        10
    );
}

#[tokio::test]
async fn test_failed_listing_page_contributes_no_links() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        count_page(45),
    );
    let links: Vec<String> = (0..45)
        .map(|i| format!("https://www.bulurum.com/biz/f{}", i))
        .collect();
    seed_listing_run(&mut pages, &links, 3, dirscrape::site::SortOrder::AtoZ);
    // Middle listing page never renders its results container.
    pages.insert(
        dirscrape::site::listing_page(BASE, &query(), 1, dirscrape::site::SortOrder::AtoZ),
        "<html><body><div class=\"maintenance\">Bakımdayız</div></body></html>".to_string(),
    );

    let session = MockSession::new(pages);
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    let RunOutcome::Success { data, .. } = outcome else {
        panic!("expected success");
    };
    // Pages 0 and 2 contribute 20 + 5 links; the broken page contributes none.
    assert_eq!(data.len(), 25);

    let mut scraped_pages = 0;
    let mut failed_pages = 0;
    while let Ok(event) = events.try_recv() {
        match event.code {
            EventCode::IndividualLinksPageScraped => scraped_pages += 1,
            EventCode::IndividualLinksPageScrapingFailed => failed_pages += 1,
            _ => {}
        }
    }
    assert_eq!(scraped_pages, 2);
    assert_eq!(failed_pages, 1);
}

#[tokio::test]
async fn test_unsolvable_challenge_is_non_fatal() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        count_page(3),
    );
    let links: Vec<String> = (0..3)
        .map(|i| format!("https://www.bulurum.com/biz/f{}", i))
        .collect();
    seed_listing_run(&mut pages, &links, 1, dirscrape::site::SortOrder::AtoZ);

    let session = MockSession::with_unsolvable_challenge(pages);
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    // Page content still loads, so the run completes despite the challenge.
    let RunOutcome::Success { data, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(data.len(), 3);

    let mut found = 0;
    let mut solving_failed = 0;
    while let Ok(event) = events.try_recv() {
        match event.code {
            EventCode::RecaptchaFound => found += 1,
            EventCode::RecaptchaSolvingFailed => solving_failed += 1,
            _ => {}
        }
    }
    // Root + one listing page + three detail pages each hit the challenge.
    assert_eq!(found, 5);
    assert_eq!(solving_failed, 5);
    assert_eq!(session.visited().len(), 5);
}

#[tokio::test]
async fn test_failed_entity_is_skipped_not_fatal() {
    let mut pages = HashMap::new();
    pages.insert(
        dirscrape::site::listing_root(BASE, &query()),
        count_page(3),
    );
    let links: Vec<String> = (0..3)
        .map(|i| format!("https://www.bulurum.com/biz/f{}", i))
        .collect();
    seed_listing_run(&mut pages, &links, 1, dirscrape::site::SortOrder::AtoZ);
    // Second detail page carries no company name at all.
    pages.insert(
        links[1].clone(),
        "<html><body><span id=\"ProfessionLbl\">Veteriner</span></body></html>".to_string(),
    );

    let session = MockSession::new(pages);
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let outcome = pipeline(bus).run_with_session(&session, &query()).await;

    let RunOutcome::Success { data, .. } = outcome else {
        panic!("expected success");
    };
    assert_eq!(data.len(), 2);

    let mut scraped = 0;
    let mut failed = 0;
    while let Ok(event) = events.try_recv() {
        match event.code {
            EventCode::IndividualEntityScraped => scraped += 1,
            EventCode::IndividualEntityScrapingFailed => failed += 1,
            _ => {}
        }
    }
    assert_eq!(scraped, 2);
    assert_eq!(failed, 1);
    assert_eq!(scraped + failed, links.len());
}
