// ==========================================
// 验收抽样决策系统 - 评估记录 CSV 导出
// ==========================================
// 职责: 将历史评估记录导出为 CSV
// 列名: Plan, LotSize, SampleSize, AcceptanceNo, Defects, Decision, Date
//       (单次方案填 n/c, 二次方案填 n1/c1, 沿用既有导出口径)
// ==========================================

use std::path::Path;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::record::SamplingRecord;

/// 导出的列头 (口径固定, 消费方按列名解析)
const CSV_HEADERS: [&str; 7] = [
    "Plan",
    "LotSize",
    "SampleSize",
    "AcceptanceNo",
    "Defects",
    "Decision",
    "Date",
];

// ==========================================
// RecordCsvExporter - 记录导出器
// ==========================================
pub struct RecordCsvExporter;

impl RecordCsvExporter {
    /// 导出记录为 CSV 字符串
    pub fn export_to_string(records: &[SamplingRecord]) -> ApiResult<String> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        Self::write_records(&mut writer, records)?;

        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::ExportError(format!("CSV 缓冲回收失败: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ApiError::ExportError(format!("CSV 非 UTF-8: {}", e)))
    }

    /// 导出记录到 CSV 文件
    pub fn export_to_file<P: AsRef<Path>>(records: &[SamplingRecord], path: P) -> ApiResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .from_path(path.as_ref())
            .map_err(|e| ApiError::ExportError(format!("CSV 文件创建失败: {}", e)))?;
        Self::write_records(&mut writer, records)?;
        writer
            .flush()
            .map_err(|e| ApiError::ExportError(format!("CSV 写盘失败: {}", e)))?;

        tracing::info!(
            count = records.len(),
            path = %path.as_ref().display(),
            "评估记录已导出"
        );
        Ok(())
    }

    fn write_records<W: std::io::Write>(
        writer: &mut csv::Writer<W>,
        records: &[SamplingRecord],
    ) -> ApiResult<()> {
        writer
            .write_record(CSV_HEADERS)
            .map_err(|e| ApiError::ExportError(format!("CSV 表头写入失败: {}", e)))?;

        for record in records {
            writer
                .write_record([
                    record.plan_type().to_string(),
                    record.plan.lot_size().to_string(),
                    record.plan.stage1_sample_size().to_string(),
                    record.plan.stage1_acceptance_number().to_string(),
                    record.outcome.d1.to_string(),
                    record.decision.to_string(),
                    record.recorded_at.to_rfc3339(),
                ])
                .map_err(|e| ApiError::ExportError(format!("CSV 行写入失败: {}", e)))?;
        }
        Ok(())
    }
}
