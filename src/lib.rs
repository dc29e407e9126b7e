// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含查询与实体等核心业务模型
pub mod domain;

/// 事件模块
///
/// 进度事件的定义与广播分发
pub mod events;

/// 流水线模块
///
/// 结果计数、分页规划、链接采集、实体抽取与编排
pub mod pipeline;

/// 表示层模块
///
/// 处理HTTP请求和WebSocket连接，包括路由和处理器
pub mod presentation;

/// 会话模块
///
/// 浏览器自动化会话，包含代理认证与验证码处理
pub mod session;

/// 站点契约模块
///
/// 目标站点的URL构造规则与固定选择器
pub mod site;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
