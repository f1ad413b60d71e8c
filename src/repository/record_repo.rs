// ==========================================
// 验收抽样决策系统 - 评估记录仓储
// ==========================================
// 职责: 管理 sampling_record 表的读写
// 红线: Repository 不含业务逻辑, 判定由引擎层完成
// 说明: 单次/二次方案共用一张表, 各自参数列互为 NULL
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::plan::SamplingPlan;
use crate::domain::record::{InspectionOutcome, SamplingRecord};
use crate::domain::types::{Decision, PlanType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// SamplingRecordRepository - 评估记录仓储
// ==========================================
/// 评估记录仓储
/// 职责: sampling_record 表的插入与查询
/// 用途: 历史记录列表、OC 曲线对比的数据源
pub struct SamplingRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SamplingRecordRepository {
    /// 创建新的 SamplingRecordRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - RepositoryResult<Self>
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_tables()?;
        Ok(repo)
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        let _ = repo.ensure_tables();
        repo
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 建表与索引 (幂等)
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sampling_record (
              record_id TEXT PRIMARY KEY,
              plan_type TEXT NOT NULL,
              lot_size INTEGER NOT NULL,
              sample_size INTEGER,
              acceptance_number INTEGER,
              n1 INTEGER,
              c1 INTEGER,
              r1 INTEGER,
              n2 INTEGER,
              c2 INTEGER,
              r2 INTEGER,
              defects_observed INTEGER NOT NULL,
              defects_stage2 INTEGER,
              decision TEXT NOT NULL,
              recorded_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_sampling_record_type_time
              ON sampling_record(plan_type, recorded_at);
            "#,
        )?;
        Ok(())
    }

    /// 插入一条评估记录
    pub fn insert(&self, record: &SamplingRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, record)
    }

    /// 批量插入评估记录
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    ///
    /// # 说明
    /// - 使用事务确保原子性, 任一条失败则整批回滚
    pub fn insert_batch(&self, records: &[SamplingRecord]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for record in records {
            Self::insert_with(&tx, record)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(records.len())
    }

    /// 按记录 ID 查询 (不存在时返回 None)
    pub fn get_by_id(&self, record_id: &str) -> RepositoryResult<Option<SamplingRecord>> {
        let conn = self.get_conn()?;
        let row = conn.query_row(
            r#"
            SELECT record_id, plan_type, lot_size,
                   sample_size, acceptance_number,
                   n1, c1, r1, n2, c2, r2,
                   defects_observed, defects_stage2,
                   decision, recorded_at
            FROM sampling_record
            WHERE record_id = ?1
            "#,
            params![record_id],
            read_record_row,
        );

        match row {
            Ok(raw) => Ok(Some(record_from_row(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询最近的评估记录 (按记录时间倒序)
    pub fn list_recent(&self, limit: u32) -> RepositoryResult<Vec<SamplingRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, plan_type, lot_size,
                   sample_size, acceptance_number,
                   n1, c1, r1, n2, c2, r2,
                   defects_observed, defects_stage2,
                   decision, recorded_at
            FROM sampling_record
            ORDER BY recorded_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], read_record_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(record_from_row).collect()
    }

    /// 按方案类型查询全部记录 (按记录时间正序, 供曲线聚合使用)
    pub fn list_by_plan_type(&self, plan_type: PlanType) -> RepositoryResult<Vec<SamplingRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, plan_type, lot_size,
                   sample_size, acceptance_number,
                   n1, c1, r1, n2, c2, r2,
                   defects_observed, defects_stage2,
                   decision, recorded_at
            FROM sampling_record
            WHERE plan_type = ?1
            ORDER BY recorded_at ASC, rowid ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![plan_type.to_db_str()], read_record_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(record_from_row).collect()
    }

    /// 记录总数
    pub fn count(&self) -> RepositoryResult<u64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM sampling_record", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// 按记录 ID 删除 (不存在时返回 NotFound)
    pub fn delete_by_id(&self, record_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM sampling_record WHERE record_id = ?1",
            params![record_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "sampling_record".to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(())
    }

    /// 单条插入 (供 insert / insert_batch 共用)
    fn insert_with(conn: &Connection, record: &SamplingRecord) -> RepositoryResult<()> {
        let (sample_size, acceptance_number, n1, c1, r1, n2, c2) = match record.plan {
            SamplingPlan::Single {
                sample_size,
                acceptance_number,
                ..
            } => (
                Some(sample_size),
                Some(acceptance_number),
                None,
                None,
                None,
                None,
                None,
            ),
            SamplingPlan::Double {
                n1, c1, r1, n2, c2, ..
            } => (None, None, Some(n1), Some(c1), Some(r1), Some(n2), Some(c2)),
        };

        conn.execute(
            r#"
            INSERT INTO sampling_record (
                record_id, plan_type, lot_size,
                sample_size, acceptance_number,
                n1, c1, r1, n2, c2, r2,
                defects_observed, defects_stage2,
                decision, recorded_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15
            )
            "#,
            params![
                record.record_id,
                record.plan_type().to_db_str(),
                record.plan.lot_size(),
                sample_size,
                acceptance_number,
                n1,
                c1,
                r1,
                n2,
                c2,
                record.r2,
                record.outcome.d1,
                record.outcome.d2,
                record.decision.to_db_str(),
                record.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

// ==========================================
// 行解析辅助函数
// ==========================================

/// sampling_record 表的原始行 (列值未经领域校验)
struct SamplingRecordRow {
    record_id: String,
    plan_type: String,
    lot_size: i64,
    sample_size: Option<i64>,
    acceptance_number: Option<i64>,
    n1: Option<i64>,
    c1: Option<i64>,
    r1: Option<i64>,
    n2: Option<i64>,
    c2: Option<i64>,
    r2: Option<i64>,
    defects_observed: i64,
    defects_stage2: Option<i64>,
    decision: String,
    recorded_at: String,
}

fn read_record_row(row: &rusqlite::Row<'_>) -> SqliteResult<SamplingRecordRow> {
    Ok(SamplingRecordRow {
        record_id: row.get(0)?,
        plan_type: row.get(1)?,
        lot_size: row.get(2)?,
        sample_size: row.get(3)?,
        acceptance_number: row.get(4)?,
        n1: row.get(5)?,
        c1: row.get(6)?,
        r1: row.get(7)?,
        n2: row.get(8)?,
        c2: row.get(9)?,
        r2: row.get(10)?,
        defects_observed: row.get(11)?,
        defects_stage2: row.get(12)?,
        decision: row.get(13)?,
        recorded_at: row.get(14)?,
    })
}

/// 将原始行还原为领域记录
///
/// # 规则
/// - plan_type 决定读取哪一组参数列, 必填列为 NULL 视为脏数据
/// - 判定字符串无法识别时报错, 不做默认值兜底
fn record_from_row(row: SamplingRecordRow) -> RepositoryResult<SamplingRecord> {
    let plan_type = PlanType::from_str(&row.plan_type)
        .ok_or_else(|| RepositoryError::ValidationError(format!("未知方案类型: {}", row.plan_type)))?;

    let plan = match plan_type {
        PlanType::Single => SamplingPlan::Single {
            lot_size: require_u32("lot_size", Some(row.lot_size))?,
            sample_size: require_u32("sample_size", row.sample_size)?,
            acceptance_number: require_u32("acceptance_number", row.acceptance_number)?,
        },
        PlanType::Double => SamplingPlan::Double {
            lot_size: require_u32("lot_size", Some(row.lot_size))?,
            n1: require_u32("n1", row.n1)?,
            c1: require_u32("c1", row.c1)?,
            r1: require_u32("r1", row.r1)?,
            n2: require_u32("n2", row.n2)?,
            c2: require_u32("c2", row.c2)?,
        },
    };

    let decision = Decision::from_str(&row.decision)
        .ok_or_else(|| RepositoryError::ValidationError(format!("未知判定结果: {}", row.decision)))?;

    let d1 = require_u32("defects_observed", Some(row.defects_observed))?;
    let d2 = match row.defects_stage2 {
        Some(v) => Some(require_u32("defects_stage2", Some(v))?),
        None => None,
    };
    let r2 = match row.r2 {
        Some(v) => Some(require_u32("r2", Some(v))?),
        None => None,
    };

    let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::FieldValueError {
            field: "recorded_at".to_string(),
            message: format!("时间解析失败: {}", e),
        })?;

    Ok(SamplingRecord {
        record_id: row.record_id,
        plan,
        outcome: InspectionOutcome { d1, d2 },
        r2,
        decision,
        recorded_at,
    })
}

fn require_u32(field: &str, value: Option<i64>) -> RepositoryResult<u32> {
    let raw = value.ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: "必填列为 NULL".to_string(),
    })?;
    u32::try_from(raw).map_err(|_| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("数值超出范围: {}", raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_repo() -> SamplingRecordRepository {
        let conn = Connection::open_in_memory().unwrap();
        SamplingRecordRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn single_record(d: u32, decision: Decision) -> SamplingRecord {
        let plan = SamplingPlan::Single {
            lot_size: 500,
            sample_size: 50,
            acceptance_number: 2,
        };
        SamplingRecord::new(plan, InspectionOutcome::stage1(d), decision)
    }

    fn double_record(d1: u32, d2: u32, decision: Decision) -> SamplingRecord {
        let plan = SamplingPlan::Double {
            lot_size: 500,
            n1: 50,
            c1: 2,
            r1: 5,
            n2: 50,
            c2: 6,
        };
        SamplingRecord::new(plan, InspectionOutcome::two_stage(d1, d2), decision).with_r2(Some(7))
    }

    #[test]
    fn test_insert_and_get_single() {
        let repo = create_test_repo();
        let record = single_record(2, Decision::Accept);
        repo.insert(&record).unwrap();

        let loaded = repo.get_by_id(&record.record_id).unwrap().unwrap();
        assert_eq!(loaded.plan, record.plan);
        assert_eq!(loaded.outcome, record.outcome);
        assert_eq!(loaded.decision, Decision::Accept);
        assert!(loaded.r2.is_none());
        assert_eq!(
            loaded.recorded_at.timestamp_millis(),
            record.recorded_at.timestamp_millis()
        );
    }

    #[test]
    fn test_insert_and_get_double() {
        let repo = create_test_repo();
        let record = double_record(3, 2, Decision::Accept);
        repo.insert(&record).unwrap();

        let loaded = repo.get_by_id(&record.record_id).unwrap().unwrap();
        assert_eq!(loaded.plan, record.plan);
        assert_eq!(loaded.outcome.d1, 3);
        assert_eq!(loaded.outcome.d2, Some(2));
        assert_eq!(loaded.r2, Some(7));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let repo = create_test_repo();
        assert!(repo.get_by_id("no-such-id").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let repo = create_test_repo();
        let record = single_record(1, Decision::Accept);
        repo.insert(&record).unwrap();

        let err = repo.insert(&record).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_insert_batch_and_count() {
        let repo = create_test_repo();
        let records = vec![
            single_record(0, Decision::Accept),
            single_record(3, Decision::Reject),
            double_record(3, 1, Decision::Accept),
        ];
        let inserted = repo.insert_batch(&records).unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn test_list_by_plan_type_filters() {
        let repo = create_test_repo();
        repo.insert(&single_record(1, Decision::Accept)).unwrap();
        repo.insert(&double_record(3, 2, Decision::Accept)).unwrap();
        repo.insert(&single_record(4, Decision::Reject)).unwrap();

        let singles = repo.list_by_plan_type(PlanType::Single).unwrap();
        assert_eq!(singles.len(), 2);
        assert!(singles.iter().all(|r| r.plan_type() == PlanType::Single));

        let doubles = repo.list_by_plan_type(PlanType::Double).unwrap();
        assert_eq!(doubles.len(), 1);
    }

    #[test]
    fn test_list_recent_orders_newest_first() {
        let repo = create_test_repo();
        let mut old = single_record(1, Decision::Accept);
        old.recorded_at = Utc::now() - chrono::Duration::hours(2);
        let new = single_record(2, Decision::Accept);
        repo.insert(&old).unwrap();
        repo.insert(&new).unwrap();

        let recent = repo.list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].record_id, new.record_id);
        assert_eq!(recent[1].record_id, old.record_id);

        let limited = repo.list_recent(1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].record_id, new.record_id);
    }

    #[test]
    fn test_delete_by_id() {
        let repo = create_test_repo();
        let record = single_record(1, Decision::Accept);
        repo.insert(&record).unwrap();

        repo.delete_by_id(&record.record_id).unwrap();
        assert!(repo.get_by_id(&record.record_id).unwrap().is_none());

        let err = repo.delete_by_id(&record.record_id).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_plan_type_rejected() {
        let repo = create_test_repo();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                r#"
                INSERT INTO sampling_record (
                    record_id, plan_type, lot_size, defects_observed, decision, recorded_at
                ) VALUES ('bad-row', 'TRIPLE', 100, 1, 'ACCEPT', '2026-08-21T00:00:00+00:00')
                "#,
                [],
            )
            .unwrap();
        }

        let err = repo.get_by_id("bad-row").unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError(_)));
    }

    #[test]
    fn test_missing_required_column_rejected() {
        let repo = create_test_repo();
        {
            let conn = repo.get_conn().unwrap();
            // 单次方案缺 sample_size 列值
            conn.execute(
                r#"
                INSERT INTO sampling_record (
                    record_id, plan_type, lot_size, acceptance_number,
                    defects_observed, decision, recorded_at
                ) VALUES ('half-row', 'SINGLE', 100, 2, 1, 'ACCEPT', '2026-08-21T00:00:00+00:00')
                "#,
                [],
            )
            .unwrap();
        }

        let err = repo.get_by_id("half-row").unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { field, .. } if field == "sample_size"));
    }
}
