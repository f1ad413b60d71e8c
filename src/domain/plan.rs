// ==========================================
// 验收抽样决策系统 - 抽样方案领域模型
// ==========================================
// 方案参数全部为非负整数; 概率计算按无限总体
// 二项分布处理, 批量 N 只参与输入校验不参与数学
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::types::PlanType;

// ==========================================
// SamplingPlan - 抽样方案 (带标签联合)
// ==========================================
// Single 与 Double 各自持有命名字段, 不做跨类型
// 字段回退 (sampleSize/n/n1 之类的歧义由此消除)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "planType")]
pub enum SamplingPlan {
    /// 单次抽样: 抽 n 件, 不合格数 d <= c 则接收
    Single {
        #[serde(rename = "lotSize")]
        lot_size: u32, // 批量 N
        #[serde(rename = "sampleSize")]
        sample_size: u32, // 样本量 n
        #[serde(rename = "acceptanceNumber")]
        acceptance_number: u32, // 接收数 c
    },
    /// 二次抽样: 第一阶段 (n1, c1, r1) 三分区,
    /// 不确定时第二阶段按累计不合格数与 c2 比较
    Double {
        #[serde(rename = "lotSize")]
        lot_size: u32, // 批量 N
        n1: u32, // 第一阶段样本量
        c1: u32, // 第一阶段接收数
        r1: u32, // 第一阶段拒收数 (d1 >= r1 即拒收)
        n2: u32, // 第二阶段样本量
        c2: u32, // 累计接收数 (d1 + d2 <= c2 则接收)
    },
}

// ==========================================
// PlanKey - 曲线分组键
// ==========================================
// OC 曲线只由概率相关参数决定, 分组键不含批量 N:
// 同参数不同批量的历史记录归入同一条曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlanKey {
    Single { n: u32, c: u32 },
    Double { n1: u32, c1: u32, r1: u32, n2: u32, c2: u32 },
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKey::Single { n, c } => write!(f, "{}-{}", n, c),
            PlanKey::Double { n1, c1, r1, n2, c2 } => {
                write!(f, "{}-{}-{}-{}-{}", n1, c1, r1, n2, c2)
            }
        }
    }
}

impl SamplingPlan {
    /// 方案类型
    pub fn plan_type(&self) -> PlanType {
        match self {
            SamplingPlan::Single { .. } => PlanType::Single,
            SamplingPlan::Double { .. } => PlanType::Double,
        }
    }

    /// 批量 N
    pub fn lot_size(&self) -> u32 {
        match self {
            SamplingPlan::Single { lot_size, .. } => *lot_size,
            SamplingPlan::Double { lot_size, .. } => *lot_size,
        }
    }

    /// 曲线分组键 (精确整数元组, 不含批量)
    pub fn curve_key(&self) -> PlanKey {
        match self {
            SamplingPlan::Single { sample_size, acceptance_number, .. } => PlanKey::Single {
                n: *sample_size,
                c: *acceptance_number,
            },
            SamplingPlan::Double { n1, c1, r1, n2, c2, .. } => PlanKey::Double {
                n1: *n1,
                c1: *c1,
                r1: *r1,
                n2: *n2,
                c2: *c2,
            },
        }
    }

    /// 第一阶段样本量 (单次方案即 n)
    pub fn stage1_sample_size(&self) -> u32 {
        match self {
            SamplingPlan::Single { sample_size, .. } => *sample_size,
            SamplingPlan::Double { n1, .. } => *n1,
        }
    }

    /// 第一阶段接收数 (单次方案即 c)
    pub fn stage1_acceptance_number(&self) -> u32 {
        match self {
            SamplingPlan::Single { acceptance_number, .. } => *acceptance_number,
            SamplingPlan::Double { c1, .. } => *c1,
        }
    }
}
