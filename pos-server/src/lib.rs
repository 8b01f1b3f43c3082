//! POS Server - 多租户餐厅点单与库存后端
//!
//! # 架构概述
//!
//! - **订单引擎** (`orders`): 桌台下单 / 结账 / 退菜, 每桌串行
//! - **库存** (`inventory`): 采购 / 销售 / 出库单据与报损, 维护加权均价
//! - **数据库** (`db`): SQLite (sqlx) 存储与仓储函数
//! - **认证** (`auth`): JWT + Argon2 认证体系, 按角色授权
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由装配与中间件
//! ├── orders/        # 订单 / 桌台引擎
//! ├── inventory/     # 库存台账
//! ├── utils/         # 错误、日志、金额、时区
//! └── db/            # 数据库层
//! ```

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use orders::OrdersManager;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 加载 `.env`、读取配置并初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env is optional
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
