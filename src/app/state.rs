// ==========================================
// 验收抽样决策系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约定: 所有仓储与配置共享一个 SQLite 连接
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{ReportApi, SamplingApi};
use crate::config::config_manager::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::repository::record_repo::SamplingRecordRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 抽样评估API
    pub sampling_api: Arc<SamplingApi>,

    /// OC 曲线对比报告API
    pub report_api: Arc<ReportApi>,

    /// 评估记录仓储（供导出等直接读取场景）
    pub record_repo: Arc<SamplingRecordRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接 (统一 PRAGMA)
    /// 2. 初始化仓储与配置管理器 (幂等建表)
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // 仓储层
        let record_repo = Arc::new(SamplingRecordRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // API层
        let sampling_api = Arc::new(SamplingApi::new(
            record_repo.clone(),
            config_manager.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            record_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            sampling_api,
            report_api,
            record_repo,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/acceptance-sampling-dev/acceptance_sampling.db
/// - 生产环境: 用户数据目录/acceptance-sampling/acceptance_sampling.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("ACCEPTANCE_SAMPLING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./acceptance_sampling.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("acceptance-sampling-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("acceptance-sampling");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("acceptance_sampling.db");
    }

    path.to_string_lossy().to_string()
}
