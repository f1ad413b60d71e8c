// ==========================================
// 验收抽样决策系统 - 领域模型层
// ==========================================
// 职责: 定义抽样方案、观测结果、判定与记录实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod plan;
pub mod record;
pub mod types;

// 重导出核心类型
pub use plan::{PlanKey, SamplingPlan};
pub use record::{InspectionOutcome, SamplingRecord};
pub use types::{Decision, PlanType, Stage1Outcome};
