// ==========================================
// 验收抽样决策系统 - 评估记录领域模型
// ==========================================
// 记录由 API 层在得到终局判定后创建一次,
// 此后不可变; 引擎只读取记录推导对比曲线
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::plan::SamplingPlan;
use crate::domain::types::{Decision, PlanType};

// ==========================================
// InspectionOutcome - 检验观测结果
// ==========================================
// 单次方案只有 d1 (即 d); 二次方案在第一阶段
// 不确定时才存在 d2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionOutcome {
    pub d1: u32,         // 第一阶段不合格数
    pub d2: Option<u32>, // 第二阶段不合格数 (仅二次方案第二阶段)
}

impl InspectionOutcome {
    /// 单阶段观测
    pub fn stage1(d1: u32) -> Self {
        Self { d1, d2: None }
    }

    /// 两阶段观测
    pub fn two_stage(d1: u32, d2: u32) -> Self {
        Self { d1, d2: Some(d2) }
    }

    /// 累计不合格数
    pub fn cumulative_defects(&self) -> u32 {
        self.d1 + self.d2.unwrap_or(0)
    }
}

// ==========================================
// SamplingRecord - 评估记录
// ==========================================
// 对齐 sampling_record 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingRecord {
    pub record_id: String,             // 记录ID (UUID)
    pub plan: SamplingPlan,            // 方案参数快照
    pub outcome: InspectionOutcome,    // 观测结果
    pub r2: Option<u32>,               // 第二阶段拒收数 (备查字段, 不参与判定)
    pub decision: Decision,            // 终局判定
    pub recorded_at: DateTime<Utc>,    // 记录时间 (UTC)
}

impl SamplingRecord {
    /// 创建新的评估记录 (生成 UUID 与当前时间戳)
    pub fn new(plan: SamplingPlan, outcome: InspectionOutcome, decision: Decision) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            plan,
            outcome,
            r2: None,
            decision,
            recorded_at: Utc::now(),
        }
    }

    /// 附加备查的第二阶段拒收数
    pub fn with_r2(mut self, r2: Option<u32>) -> Self {
        self.r2 = r2;
        self
    }

    /// 方案类型
    pub fn plan_type(&self) -> PlanType {
        self.plan.plan_type()
    }
}
