// ==========================================
// 验收抽样决策系统 - OC 曲线对比报告 API
// ==========================================
// 职责: 历史记录 → 去重方案 → 并行计算各方案曲线 →
//       同型平均 → 单次/二次合并为一张对比序列
// 约定: 某一类型无历史数据不算失败, 该侧序列为空并记告警
// ==========================================

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ReportConfigReader};
use crate::domain::plan::SamplingPlan;
use crate::domain::types::PlanType;
use crate::engine::{
    CurveAggregator, DoubleSamplingEngine, MergedCurvePoint, OcCurve, OcSweep,
    SingleSamplingEngine,
};
use crate::repository::record_repo::SamplingRecordRepository;

// ==========================================
// ComparisonReport - 对比报告响应
// ==========================================

/// OC 曲线对比报告
///
/// # 字段
/// - single_series / double_series: 各类型去重方案曲线的按位平均;
///   该类型无历史数据时为空序列
/// - merged: 两条平均曲线按不合格率合并后的对比表
/// - single_plan_count / double_plan_count: 参与平均的去重方案数
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    #[serde(rename = "singleSeries")]
    pub single_series: OcCurve,
    #[serde(rename = "doubleSeries")]
    pub double_series: OcCurve,
    pub merged: Vec<MergedCurvePoint>,
    #[serde(rename = "singlePlanCount")]
    pub single_plan_count: usize,
    #[serde(rename = "doublePlanCount")]
    pub double_plan_count: usize,
}

// ==========================================
// ReportApi - 对比报告 API
// ==========================================

/// OC 曲线对比报告API
///
/// 职责：
/// 1. 读取历史评估记录并提取去重方案
/// 2. 并行计算各方案的 OC 曲线 (并发上限可配置)
/// 3. 聚合为单次/二次两条平均曲线与一张合并对比表
pub struct ReportApi {
    record_repo: Arc<SamplingRecordRepository>,
    config: Arc<ConfigManager>,
    aggregator: CurveAggregator,
}

impl ReportApi {
    /// 创建新的 ReportApi 实例
    pub fn new(record_repo: Arc<SamplingRecordRepository>, config: Arc<ConfigManager>) -> Self {
        Self {
            record_repo,
            config,
            aggregator: CurveAggregator::new(),
        }
    }

    /// 构建单次 vs 二次方案的 OC 曲线对比报告
    ///
    /// # 流程
    /// 1. 按类型读取历史记录, 提取去重方案
    /// 2. 各方案曲线独立计算, 按配置的并发上限分块并行
    /// 3. 同型曲线按位平均 (所有曲线共用同一扫描配置)
    /// 4. 两条平均曲线按不合格率合并
    ///
    /// # 说明
    /// 某一类型没有任何可用方案时该侧序列为空, 仅记录告警;
    /// 两侧都为空时报告同样返回 (空报告), 由调用方决定呈现方式
    pub async fn build_comparison(&self) -> ApiResult<ComparisonReport> {
        let sweep_step = self
            .config
            .get_oc_sweep_step()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取扫描步长配置失败: {}", e)))?;
        let tolerance = self
            .config
            .get_merge_tolerance()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取合并容差配置失败: {}", e)))?;
        let concurrency = self
            .config
            .get_report_concurrency()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取并发上限配置失败: {}", e)))?;
        let sweep = OcSweep::new(sweep_step);

        let single_plans = self.distinct_plans_of(PlanType::Single)?;
        let double_plans = self.distinct_plans_of(PlanType::Double)?;

        if single_plans.is_empty() {
            tracing::warn!("没有可用的单次方案历史数据, 单次序列为空");
        }
        if double_plans.is_empty() {
            tracing::warn!("没有可用的二次方案历史数据, 二次序列为空");
        }

        let single_curves = compute_curves(single_plans.clone(), sweep, concurrency).await;
        let double_curves = compute_curves(double_plans.clone(), sweep, concurrency).await;

        let single_series = self.aggregator.average_curve(&single_curves);
        let double_series = self.aggregator.average_curve(&double_curves);
        let merged = self
            .aggregator
            .merge_by_defect_rate(&single_series, &double_series, tolerance);

        tracing::info!(
            single_plans = single_plans.len(),
            double_plans = double_plans.len(),
            merged_rows = merged.len(),
            "对比报告构建完成"
        );

        Ok(ComparisonReport {
            single_series,
            double_series,
            merged,
            single_plan_count: single_curves.len(),
            double_plan_count: double_curves.len(),
        })
    }

    /// 读取某类型的全部历史记录并提取去重方案
    fn distinct_plans_of(&self, plan_type: PlanType) -> ApiResult<Vec<SamplingPlan>> {
        let records = self.record_repo.list_by_plan_type(plan_type)?;
        Ok(self.aggregator.distinct_plans(&records))
    }
}

/// 并行计算一批方案的 OC 曲线
///
/// 曲线计算是纯 CPU 工作, 走 spawn_blocking 避免占用异步线程;
/// 方案数无上界, 按并发上限分块推进以约束内存与线程占用。
/// 单条曲线失败 (脏历史数据, 如 c1 >= r1) 只告警跳过, 不拖垮整个报告
async fn compute_curves(plans: Vec<SamplingPlan>, sweep: OcSweep, concurrency: usize) -> Vec<OcCurve> {
    use futures::future::join_all;

    let mut curves = Vec::with_capacity(plans.len());
    for chunk in plans.chunks(concurrency.max(1)) {
        let tasks = chunk.iter().cloned().map(|plan| {
            tokio::task::spawn_blocking(move || {
                let key = plan.curve_key();
                (key, curve_for_plan(&plan, sweep))
            })
        });

        for joined in join_all(tasks).await {
            match joined {
                Ok((_, Ok(curve))) => curves.push(curve),
                Ok((key, Err(e))) => {
                    tracing::warn!(plan = %key, error = %e, "方案曲线计算失败, 跳过");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "曲线计算任务被中断, 跳过");
                }
            }
        }
    }
    curves
}

/// 单个方案的曲线计算 (同步纯计算)
fn curve_for_plan(plan: &SamplingPlan, sweep: OcSweep) -> crate::engine::EngineResult<OcCurve> {
    match *plan {
        SamplingPlan::Single {
            sample_size,
            acceptance_number,
            ..
        } => SingleSamplingEngine::new().oc_curve(sample_size, acceptance_number, sweep),
        SamplingPlan::Double {
            n1, c1, r1, n2, c2, ..
        } => DoubleSamplingEngine::new().oc_curve(n1, c1, r1, n2, c2, sweep),
    }
}
