// ==========================================
// 验收抽样决策系统 - OC 曲线聚合引擎
// ==========================================
// 职责: 历史记录去重出方案、同型曲线平均、
//       单次/二次曲线按不合格率合并对比
// 红线: 纯归约, 无 I/O; 曲线计算由调用方完成
// ==========================================

use serde::Serialize;

use crate::domain::plan::SamplingPlan;
use crate::domain::record::SamplingRecord;
use crate::engine::oc_curve::{OcCurve, OcCurvePoint};
use std::collections::HashSet;

/// 默认合并容差 (绝对值, 按不合格率匹配两侧曲线点)
pub const DEFAULT_MERGE_TOLERANCE: f64 = 0.001;

// ==========================================
// MergedCurvePoint - 对比序列行
// ==========================================
// 两侧曲线在同一不合格率附近各取一点;
// 缺失侧为 null
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergedCurvePoint {
    #[serde(rename = "defectRate")]
    pub defect_rate: f64,
    #[serde(rename = "probA")]
    pub prob_a: Option<f64>,
    #[serde(rename = "probB")]
    pub prob_b: Option<f64>,
}

// ==========================================
// CurveAggregator - 曲线聚合引擎
// ==========================================
pub struct CurveAggregator {
    // 无状态引擎,不需要注入依赖
}

impl CurveAggregator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 从历史记录提取去重后的方案集合
    ///
    /// # 规则
    /// - 按方案类型 + 参数元组精确分组 (整数相等, 无模糊匹配)
    /// - 分组键不含批量 N
    /// - 样本量为零的记录视为参数不完整, 跳过
    /// - 保持首次出现顺序, 同组取首条记录的方案快照
    pub fn distinct_plans(&self, records: &[SamplingRecord]) -> Vec<SamplingPlan> {
        let mut seen = HashSet::new();
        let mut plans = Vec::new();

        for record in records {
            match &record.plan {
                SamplingPlan::Single { sample_size, .. } if *sample_size == 0 => continue,
                SamplingPlan::Double { n1, n2, .. } if *n1 == 0 || *n2 == 0 => continue,
                _ => {}
            }
            let key = record.plan.curve_key();
            if seen.insert(key) {
                plans.push(record.plan.clone());
            }
        }
        plans
    }

    /// 同型方案曲线的按位平均
    ///
    /// # 规则
    /// 逐位置索引对 probAccept 取均值, 较短曲线在自身
    /// 长度之外不再参与; 该点的 defectRate 取第一条曲线
    /// 同位置的值, 缺失时回退 index * 0.01。
    ///
    /// 已知近似: 按索引对位而非按不合格率对位, 仅当所有
    /// 参与曲线采用同一扫描配置时成立; 更严格的做法是先
    /// 重采样到统一网格, 此处保留观测到的既有行为
    pub fn average_curve(&self, curves: &[OcCurve]) -> OcCurve {
        let valid: Vec<&OcCurve> = curves.iter().filter(|c| !c.is_empty()).collect();
        if valid.is_empty() {
            return Vec::new();
        }

        let max_len = valid.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut averaged = Vec::with_capacity(max_len);

        for i in 0..max_len {
            let mut sum = 0.0;
            let mut count = 0usize;
            for curve in &valid {
                if let Some(point) = curve.get(i) {
                    sum += point.prob_accept;
                    count += 1;
                }
            }
            if count > 0 {
                let defect_rate = valid[0]
                    .get(i)
                    .map(|point| point.defect_rate)
                    .unwrap_or(i as f64 * 0.01);
                averaged.push(OcCurvePoint {
                    defect_rate,
                    prob_accept: sum / count as f64,
                });
            }
        }
        averaged
    }

    /// 两条曲线按不合格率合并为一张对比序列
    ///
    /// # 规则
    /// 取两侧 defectRate 的并集升序排列; 某侧在该率
    /// 附近 (绝对差 < tolerance) 有点则填入其 probAccept,
    /// 否则该侧为 null
    pub fn merge_by_defect_rate(
        &self,
        curve_a: &OcCurve,
        curve_b: &OcCurve,
        tolerance: f64,
    ) -> Vec<MergedCurvePoint> {
        let mut rates: Vec<f64> = curve_a
            .iter()
            .chain(curve_b.iter())
            .map(|point| point.defect_rate)
            .collect();
        rates.sort_by(f64::total_cmp);
        rates.dedup();

        rates
            .into_iter()
            .map(|rate| MergedCurvePoint {
                defect_rate: rate,
                prob_a: Self::find_near(curve_a, rate, tolerance),
                prob_b: Self::find_near(curve_b, rate, tolerance),
            })
            .collect()
    }

    /// 曲线中首个落在容差内的点
    fn find_near(curve: &OcCurve, rate: f64, tolerance: f64) -> Option<f64> {
        curve
            .iter()
            .find(|point| (point.defect_rate - rate).abs() < tolerance)
            .map(|point| point.prob_accept)
    }
}

impl Default for CurveAggregator {
    fn default() -> Self {
        Self::new()
    }
}
