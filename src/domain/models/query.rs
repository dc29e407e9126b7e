// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 目录查询
///
/// 一次查询由类别、区与城市三个不透明的URL路径段组成，
/// 发出后不可变，每次查询对应恰好一次流水线运行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// 实体类别
    pub category: String,
    /// 区名
    pub district: String,
    /// 城市名
    pub city: String,
}

impl Query {
    pub fn new(
        category: impl Into<String>,
        district: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            district: district.into(),
            city: city.into(),
        }
    }
}
