use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrdersManager;
use crate::utils::error::set_expose_details;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池句柄实现浅拷贝，每个请求 clone 一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | orders | OrdersManager | 订单/桌台引擎 (含每桌锁) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 订单引擎
    pub orders: OrdersManager,
}

impl ServerState {
    /// 使用已打开的连接池构造状态
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = OrdersManager::new(pool.clone());
        set_expose_details(!config.is_production());
        Self {
            config,
            pool,
            jwt_service,
            orders,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 工作目录
    /// 2. 数据库 (迁移)
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(config.work_dir_path())?;

        let db = DbService::new(&config.database_url).await?;
        tracing::info!(database_url = %config.database_url, "Database ready");

        Ok(Self::new(config.clone(), db.pool))
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
