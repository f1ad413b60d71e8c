// ==========================================
// 验收抽样决策系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::report_config_trait::ReportConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_tables()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        let manager = Self { conn };
        manager.ensure_tables()?;
        Ok(manager)
    }

    /// 建表与 global 作用域 (幂等)
    fn ensure_tables(&self) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_scope (
              scope_id TEXT PRIMARY KEY,
              scope_type TEXT NOT NULL,
              scope_key TEXT NOT NULL,
              created_at TEXT NOT NULL DEFAULT (datetime('now')),
              UNIQUE(scope_type, scope_key)
            );

            INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
            VALUES ('global', 'GLOBAL', 'global');

            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 参数
    /// - key: 配置键
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT 语义）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        // 使用UPSERT语法（SQLite 3.24.0+）
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    ///
    /// # 参数
    /// - key: 配置键
    /// - default: 默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 配置快照的JSON字符串
    ///
    /// # 用途
    /// - 启动时输出当前配置, 便于排查口径问题
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        // 查询所有global scope的配置
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        // 序列化为JSON
        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 记录列表配置 =====

    /// 获取历史记录列表的默认页大小
    ///
    /// # 返回
    /// - u32: 每页记录数（默认 50）
    pub fn get_record_page_size(&self) -> Result<u32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::RECORD_PAGE_SIZE, "50")?;
        Ok(value.parse::<u32>().unwrap_or(50))
    }
}

// ==========================================
// ReportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReportConfigReader for ConfigManager {
    async fn get_oc_sweep_step(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::OC_SWEEP_STEP, "0.01")?;
        Ok(value.parse::<f64>().unwrap_or(0.01))
    }

    async fn get_merge_tolerance(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MERGE_TOLERANCE, "0.001")?;
        Ok(value.parse::<f64>().unwrap_or(0.001))
    }

    async fn get_report_concurrency(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::REPORT_CONCURRENCY, "4")?;
        let concurrency = value.parse::<usize>().unwrap_or(4);
        // 并发上限为 0 会让报告卡死
        Ok(concurrency.max(1))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // OC 曲线
    pub const OC_SWEEP_STEP: &str = "oc_sweep_step";
    pub const MERGE_TOLERANCE: &str = "merge_tolerance";

    // 对比报告
    pub const REPORT_CONCURRENCY: &str = "report_concurrency";

    // 历史记录
    pub const RECORD_PAGE_SIZE: &str = "record_page_size";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_set_and_get_value() {
        let manager = create_test_manager();
        assert!(manager.get_global_config_value("oc_sweep_step").unwrap().is_none());

        manager.set_global_config_value("oc_sweep_step", "0.05").unwrap();
        assert_eq!(
            manager.get_global_config_value("oc_sweep_step").unwrap(),
            Some("0.05".to_string())
        );

        // UPSERT 覆盖
        manager.set_global_config_value("oc_sweep_step", "0.02").unwrap();
        assert_eq!(
            manager.get_global_config_value("oc_sweep_step").unwrap(),
            Some("0.02".to_string())
        );
    }

    #[test]
    fn test_record_page_size_default_and_fallback() {
        let manager = create_test_manager();
        assert_eq!(manager.get_record_page_size().unwrap(), 50);

        manager.set_global_config_value("record_page_size", "20").unwrap();
        assert_eq!(manager.get_record_page_size().unwrap(), 20);

        manager.set_global_config_value("record_page_size", "not-a-number").unwrap();
        assert_eq!(manager.get_record_page_size().unwrap(), 50);
    }

    #[test]
    fn test_config_snapshot_contains_all_keys() {
        let manager = create_test_manager();
        manager.set_global_config_value("oc_sweep_step", "0.01").unwrap();
        manager.set_global_config_value("merge_tolerance", "0.001").unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("oc_sweep_step"), Some(&"0.01".to_string()));
    }

    #[tokio::test]
    async fn test_report_reader_defaults() {
        let manager = create_test_manager();
        assert!((manager.get_oc_sweep_step().await.unwrap() - 0.01).abs() < 1e-12);
        assert!((manager.get_merge_tolerance().await.unwrap() - 0.001).abs() < 1e-12);
        assert_eq!(manager.get_report_concurrency().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_report_reader_overrides() {
        let manager = create_test_manager();
        manager.set_global_config_value("oc_sweep_step", "0.1").unwrap();
        manager.set_global_config_value("report_concurrency", "0").unwrap();

        assert!((manager.get_oc_sweep_step().await.unwrap() - 0.1).abs() < 1e-12);
        // 0 被钳到 1
        assert_eq!(manager.get_report_concurrency().await.unwrap(), 1);
    }
}
