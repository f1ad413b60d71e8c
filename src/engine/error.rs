// ==========================================
// 验收抽样决策系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分两类: 输入校验错误 (调用方可修正) 与
// 概率核域错误 (上游契约被破坏, 必须响亮失败)
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 输入校验错误 =====
    #[error("观测不合格数超出样本量 (d={d}, n={n})")]
    DefectsExceedSample { d: u32, n: u32 },

    #[error("方案参数不合法: 要求 c1 < r1 (c1={c1}, r1={r1})")]
    AcceptRejectOverlap { c1: u32, r1: u32 },

    #[error("第一阶段结果非不确定区, 不允许第二阶段判定 (d1={d1}, c1={c1}, r1={r1})")]
    Stage2NotReached { d1: u32, c1: u32, r1: u32 },

    #[error("曲线扫描步长不合法: {0} (要求 0 < step <= 1)")]
    InvalidSweepStep(f64),

    // ===== 概率核域错误 =====
    #[error("二项分布参数为负 (n={n}, k={k})")]
    NegativeArgument { n: i64, k: i64 },

    #[error("成功数超过试验数 (k={k}, n={n})")]
    SuccessesExceedTrials { k: i64, n: i64 },

    #[error("概率值超出 [0,1] 区间: {0}")]
    ProbabilityOutOfRange(f64),
}

impl EngineError {
    /// 是否为概率核域错误 (契约违反, 非用户输入问题)
    pub fn is_domain_violation(&self) -> bool {
        matches!(
            self,
            EngineError::NegativeArgument { .. }
                | EngineError::SuccessesExceedTrials { .. }
                | EngineError::ProbabilityOutOfRange(_)
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
