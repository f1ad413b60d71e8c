// ==========================================
// 验收抽样决策系统 - 对比报告配置读取 Trait
// ==========================================
// 职责: 定义报告模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ReportConfigReader Trait
// ==========================================
// 用途: OC 曲线对比报告所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReportConfigReader: Send + Sync {
    /// 获取 OC 曲线扫描步长
    ///
    /// # 返回
    /// - f64: 不合格率扫描步长
    ///
    /// # 默认值
    /// - 0.01 (101 个采样点)
    async fn get_oc_sweep_step(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取曲线合并的不合格率容差
    ///
    /// # 返回
    /// - f64: 两条曲线视为同一采样点的绝对容差
    ///
    /// # 默认值
    /// - 0.001
    async fn get_merge_tolerance(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取曲线计算的并发上限
    ///
    /// # 返回
    /// - usize: 同时计算的曲线数上限
    ///
    /// # 默认值
    /// - 4
    async fn get_report_concurrency(&self) -> Result<usize, Box<dyn Error>>;
}
