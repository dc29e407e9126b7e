// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 目标站点契约
//!
//! 列表页/详情页的URL构造规则与固定选择器。这些是边界数据，
//! 不属于核心逻辑；站点改版时只需要调整这里。

use serde::{Deserialize, Serialize};

use crate::domain::models::query::Query;

/// 列表页排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// 正序（A→Z），从结果集头部开始
    AtoZ,
    /// 逆序（Z→A），从结果集尾部开始
    ZtoA,
}

impl SortOrder {
    /// 站点 `Order` 查询参数的取值
    pub fn param(&self) -> &'static str {
        match self {
            SortOrder::AtoZ => "AtoZ",
            SortOrder::ZtoA => "ZtoA",
        }
    }
}

/// 查询的列表根URL：`{base}{category}/{district}-{city}`
pub fn listing_root(base_url: &str, query: &Query) -> String {
    format!(
        "{}{}/{}-{}",
        base_url, query.category, query.district, query.city
    )
}

/// 第 `index` 个列表页的URL
///
/// 首页不带 `page` 参数，后续页追加 `/?page={index}`；
/// 排序参数总是存在。与站点实际接受的形式保持一致。
pub fn listing_page(base_url: &str, query: &Query, index: u32, order: SortOrder) -> String {
    let root = listing_root(base_url, query);
    if index == 0 {
        format!("{}?Order={}", root, order.param())
    } else {
        format!("{}/?page={}&Order={}", root, index, order.param())
    }
}

/// 固定选择器集合
pub mod selectors {
    /// 验证码容器
    pub const CAPTCHA_CONTAINER: &str = ".captchaBox";
    /// 总结果数元素
    pub const RESULT_COUNT: &str = "span.mainCountTitle";
    /// “无结果”标记
    pub const NO_RESULTS: &str = "div.NoResultsContainer";
    /// 列表页结果容器
    pub const SEARCH_RESULTS: &str = "div#SearchResults";
    /// 结果行内指向详情页的锚点
    pub const RESULT_LINK: &str = "div#SearchResults a.FreeListingAreaBottomRight";
    /// 详情页公司名称
    pub const COMPANY_NAME: &str = "#CompanyNameLbl";
    /// 详情页行业描述
    pub const PROFESSIONS: &str = "#ProfessionLbl";
    /// 详情页地址
    pub const ADDRESS: &str = "#AddressLbl";
    /// 详情页主电话
    pub const PRIMARY_PHONE: &str = ".rc_firstphone";
    /// 详情页副电话
    pub const SECONDARY_PHONE: &str = "#MobileContLbl";
    /// 详情页网站链接
    pub const WEBSITE: &str = "#WebsiteContLbl > a";
    /// 详情页邮箱链接
    pub const EMAIL: &str = "#EmailContLbl > a";
    /// Instagram图标（所属锚点为链接）
    pub const INSTAGRAM_ICON: &str = "#InstagramIcon";
    /// Facebook图标（所属锚点为链接）
    pub const FACEBOOK_ICON: &str = "#FacebookIcon";
    /// 详情页地图链接
    pub const MAP_LINK: &str = "#MapContLbl > a";
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.bulurum.com/search/";

    fn query() -> Query {
        Query::new("veteriner", "sisli", "istanbul")
    }

    #[test]
    fn test_listing_root() {
        assert_eq!(
            listing_root(BASE, &query()),
            "https://www.bulurum.com/search/veteriner/sisli-istanbul"
        );
    }

    #[test]
    fn test_first_page_omits_page_parameter() {
        assert_eq!(
            listing_page(BASE, &query(), 0, SortOrder::AtoZ),
            "https://www.bulurum.com/search/veteriner/sisli-istanbul?Order=AtoZ"
        );
    }

    #[test]
    fn test_later_pages_carry_page_index() {
        assert_eq!(
            listing_page(BASE, &query(), 3, SortOrder::ZtoA),
            "https://www.bulurum.com/search/veteriner/sisli-istanbul/?page=3&Order=ZtoA"
        );
    }

    #[test]
    fn test_selectors_parse() {
        for selector in [
            selectors::CAPTCHA_CONTAINER,
            selectors::RESULT_COUNT,
            selectors::NO_RESULTS,
            selectors::SEARCH_RESULTS,
            selectors::RESULT_LINK,
            selectors::COMPANY_NAME,
            selectors::PROFESSIONS,
            selectors::ADDRESS,
            selectors::PRIMARY_PHONE,
            selectors::SECONDARY_PHONE,
            selectors::WEBSITE,
            selectors::EMAIL,
            selectors::INSTAGRAM_ICON,
            selectors::FACEBOOK_ICON,
            selectors::MAP_LINK,
        ] {
            assert!(
                scraper::Selector::parse(selector).is_ok(),
                "selector should parse: {}",
                selector
            );
        }
    }
}
