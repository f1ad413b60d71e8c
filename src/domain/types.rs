// ==========================================
// 验收抽样决策系统 - 领域类型定义
// ==========================================
// 约定: 数据库存储使用 SCREAMING_SNAKE_CASE,
//       对外 DTO 使用前端原有的 PascalCase 字符串
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 抽样方案类型 (Plan Type)
// ==========================================
// 单次抽样 / 二次抽样两种方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanType {
    Single, // 单次抽样
    Double, // 二次抽样
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Single => write!(f, "Single"),
            PlanType::Double => write!(f, "Double"),
        }
    }
}

impl PlanType {
    /// 从字符串解析方案类型 (兼容数据库大写与前端 PascalCase)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SINGLE" => Some(PlanType::Single),
            "DOUBLE" => Some(PlanType::Double),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanType::Single => "SINGLE",
            PlanType::Double => "DOUBLE",
        }
    }
}

// ==========================================
// 终局判定 (Decision)
// ==========================================
// 引擎的终局输出只有接收/拒收两种;
// "Continue" 仅是 API 层的过渡应答, 不属于终局判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept, // 接收批
    Reject, // 拒收批
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Accept => write!(f, "Accept"),
            Decision::Reject => write!(f, "Reject"),
        }
    }
}

impl Decision {
    /// 从字符串解析判定结果
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACCEPT" => Some(Decision::Accept),
            "REJECT" => Some(Decision::Reject),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Reject => "REJECT",
        }
    }
}

// ==========================================
// 第一阶段判定结果 (Stage 1 Outcome)
// ==========================================
// 二次抽样第一阶段的三分区结果; Inconclusive 是
// 显式返回值, 由调用方据此补采第二阶段数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage1Outcome {
    Accepted,     // d1 <= c1, 直接接收
    Rejected,     // d1 >= r1, 直接拒收
    Inconclusive, // c1 < d1 < r1, 需进入第二阶段
}

impl fmt::Display for Stage1Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage1Outcome::Accepted => write!(f, "ACCEPTED"),
            Stage1Outcome::Rejected => write!(f, "REJECTED"),
            Stage1Outcome::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

impl Stage1Outcome {
    /// 是否已终局 (无需第二阶段)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Stage1Outcome::Inconclusive)
    }

    /// 终局时折算为判定结果
    pub fn to_decision(&self) -> Option<Decision> {
        match self {
            Stage1Outcome::Accepted => Some(Decision::Accept),
            Stage1Outcome::Rejected => Some(Decision::Reject),
            Stage1Outcome::Inconclusive => None,
        }
    }
}
