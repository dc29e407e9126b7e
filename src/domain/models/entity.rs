// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 目录实体
///
/// 单个详情页抽取出的固定字段集合。除 `id` 外所有字段都是可选的，
/// 源页面缺失时为 `null`。`id` 在抽取时分配，与源内容无关。
/// 序列化字段名保持与对外JSON契约一致（camelCase）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// 抽取时分配的唯一标识
    pub id: String,
    /// 公司名称
    pub company_name: Option<String>,
    /// 职业/行业描述
    pub professions: Option<String>,
    /// 地址（仅首行）
    pub address: Option<String>,
    /// 主电话
    pub primary_phone: Option<String>,
    /// 副电话（移动电话）
    pub secondary_phone: Option<String>,
    /// 网站链接，必须看起来像绝对链接（包含 "http"）
    pub website_link: Option<String>,
    /// 电子邮箱，必须包含 "@"
    pub email: Option<String>,
    /// Instagram 链接
    pub instagram: Option<String>,
    /// Facebook 链接
    pub facebook: Option<String>,
    /// 地图链接
    pub map_link: Option<String>,
}
