// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 分页计划
///
/// 决定从结果集头部与尾部各取多少个列表页，以及两批链接
/// 如何合并、截断到展示上限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// 站点报告的总结果数
    pub result_count: u64,
    /// 总页数 = ceil(result_count / per_page_limit)
    pub total_pages: u32,
    /// 正序采集的页数，至多10页
    pub forward_pages: u32,
    /// 逆序采集的页数，仅当总页数超过10时非零
    pub backward_pages: u32,
    /// 每页条目上限
    pub per_page_limit: u32,
    /// 展示上限
    pub display_limit: u32,
}

impl PagePlan {
    /// 为给定的结果数制定计划
    pub fn new(result_count: u64, per_page_limit: u32, display_limit: u32) -> Self {
        let total_pages = result_count.div_ceil(u64::from(per_page_limit)) as u32;
        let forward_pages = total_pages.min(10);
        let backward_pages = if total_pages > 10 {
            (total_pages - 10).min(10)
        } else {
            0
        };

        Self {
            result_count,
            total_pages,
            forward_pages,
            backward_pages,
            per_page_limit,
            display_limit,
        }
    }

    /// 合并前保留的逆序链接条数
    ///
    /// 只保留够到展示上限所需的“尾部”链接，且不超过上限本身
    pub fn backward_keep(&self) -> usize {
        let display = u64::from(self.display_limit);
        if self.result_count <= display {
            return 0;
        }
        (self.result_count - display).min(display) as usize
    }

    /// 展示上限之外不可达实体的粗略估计
    ///
    /// 保留观察到的翻倍公式（意图未经证实，可能同时计入正逆序
    /// 两个方向上未发现的尾部），但将负值钳为0。
    pub fn loss(&self) -> i64 {
        let overflow = self.result_count as i64 - i64::from(self.display_limit);
        if overflow <= 0 {
            0
        } else {
            overflow * 2
        }
    }

    /// 按索引截断逆序链接并拼接到正序链接之后
    ///
    /// 截断是基于索引而非集合的：短结果集下两端可能重叠，
    /// 不假设全局唯一性是免费的。
    pub fn merge(&self, forward: Vec<String>, backward: Vec<String>) -> Vec<String> {
        let mut links = forward;
        let mut tail = backward;
        tail.truncate(self.backward_keep());
        links.extend(tail);
        links
    }
}
