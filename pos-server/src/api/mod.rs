//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录 / 当前用户
//! - [`restaurants`] - 租户 (餐厅) 管理
//! - [`sections`] - 区域及附加费
//! - [`tables`] - 桌台及桌台订单
//! - [`orders`] - 订单查询 / 删除 / 退菜
//! - [`waiters`] - 服务员
//! - [`groups`] - 服务员分组
//! - [`categories`] - 菜单分类
//! - [`items`] - 菜品 / 库存条目
//! - [`tags`] - 标签
//! - [`vendors`] - 供应商
//! - [`ivm`] - 库存单据 (采购 / 销售 / 出库)
//! - [`spoilage`] - 报损

pub mod auth;
pub mod health;
pub mod restaurants;

// Floor
pub mod groups;
pub mod orders;
pub mod sections;
pub mod tables;
pub mod waiters;

// Menu
pub mod categories;
pub mod items;
pub mod tags;

// Inventory
pub mod ivm;
pub mod spoilage;
pub mod vendors;

// Re-export common types for handlers
pub use crate::utils::AppResult;
