// ==========================================
// 验收抽样决策系统 - 二次抽样评估引擎
// ==========================================
// 职责: 两阶段判定状态机与两阶段 OC 曲线生成
// 状态: Stage1Pending -> {Accepted, Rejected, Stage2Pending}
//               -> {Accepted, Rejected}
// ==========================================

use crate::domain::types::{Decision, Stage1Outcome};
use crate::engine::binomial::BinomialKernel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::oc_curve::{OcCurve, OcCurvePoint, OcSweep};

// ==========================================
// DoubleSamplingEngine - 二次抽样引擎
// ==========================================
pub struct DoubleSamplingEngine {
    // 无状态引擎,不需要注入依赖
}

impl DoubleSamplingEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 第一阶段判定: 整数轴三分区
    ///
    /// # 规则
    /// - d1 <= c1        -> Accepted
    /// - d1 >= r1        -> Rejected
    /// - c1 < d1 < r1    -> Inconclusive, 须补采第二阶段
    ///
    /// # 参数
    /// - `n1`: 第一阶段样本量
    /// - `c1`: 第一阶段接收数
    /// - `r1`: 第一阶段拒收数 (要求 c1 < r1)
    /// - `d1`: 第一阶段观测不合格数 (要求 d1 <= n1)
    pub fn decide_stage1(
        &self,
        n1: u32,
        c1: u32,
        r1: u32,
        d1: u32,
    ) -> EngineResult<Stage1Outcome> {
        Self::check_stage1_plan(c1, r1)?;
        if d1 > n1 {
            return Err(EngineError::DefectsExceedSample { d: d1, n: n1 });
        }

        if d1 <= c1 {
            Ok(Stage1Outcome::Accepted)
        } else if d1 >= r1 {
            Ok(Stage1Outcome::Rejected)
        } else {
            Ok(Stage1Outcome::Inconclusive)
        }
    }

    /// 第二阶段判定: 累计不合格数与 c2 比较
    ///
    /// # 规则
    /// 仅当第一阶段为不确定区时合法;
    /// d1 + d2 <= c2 接收, 否则拒收。
    /// r2 不参与该规则 (备查字段)
    ///
    /// # 参数
    /// - `n1`/`c1`/`r1`: 第一阶段方案参数
    /// - `n2`: 第二阶段样本量
    /// - `c2`: 累计接收数
    /// - `d1`: 第一阶段观测不合格数
    /// - `d2`: 第二阶段观测不合格数 (要求 d2 <= n2)
    #[allow(clippy::too_many_arguments)]
    pub fn decide_stage2(
        &self,
        n1: u32,
        c1: u32,
        r1: u32,
        n2: u32,
        c2: u32,
        d1: u32,
        d2: u32,
    ) -> EngineResult<Decision> {
        let stage1 = self.decide_stage1(n1, c1, r1, d1)?;
        if stage1 != Stage1Outcome::Inconclusive {
            return Err(EngineError::Stage2NotReached { d1, c1, r1 });
        }
        if d2 > n2 {
            return Err(EngineError::DefectsExceedSample { d: d2, n: n2 });
        }

        if d1 + d2 <= c2 {
            Ok(Decision::Accept)
        } else {
            Ok(Decision::Reject)
        }
    }

    /// 生成二次方案 OC 曲线 (两阶段卷积)
    ///
    /// # 规则
    /// probAccept(p) = P(X1 <= c1)
    ///   + Σ_{k=c1+1}^{min(r1-1, n1)} P(X1 = k) * P(X2 <= c2 - k)
    ///
    /// 第二阶段对 X2 的有效阈值被第一阶段已消耗的
    /// 不合格数 k 抬走: c2 - k < 0 时该项为零,
    /// c2 - k >= n2 时第二阶段必然接收
    ///
    /// # 参数
    /// - `n1`/`c1`/`r1`/`n2`/`c2`: 方案参数 (要求 c1 < r1)
    /// - `sweep`: p 值扫描配置
    pub fn oc_curve(
        &self,
        n1: u32,
        c1: u32,
        r1: u32,
        n2: u32,
        c2: u32,
        sweep: OcSweep,
    ) -> EngineResult<OcCurve> {
        Self::check_stage1_plan(c1, r1)?;

        let n1 = n1 as i64;
        let n2 = n2 as i64;
        let c2 = c2 as i64;
        // c1 >= n1 时第一阶段必然接收, 截到 n1 保持核域合法
        let c1_eff = (c1 as i64).min(n1);
        let k_hi = ((r1 as i64) - 1).min(n1);

        let mut curve = Vec::new();
        for p in sweep.rates()? {
            let mut prob_accept = BinomialKernel::cdf(n1, c1_eff, p)?;

            for k in (c1 as i64 + 1)..=k_hi {
                let remaining = c2 - k;
                if remaining < 0 {
                    continue;
                }
                let stage2_accept = BinomialKernel::cdf(n2, remaining.min(n2), p)?;
                prob_accept += BinomialKernel::pmf(n1, k, p)? * stage2_accept;
            }

            curve.push(OcCurvePoint {
                defect_rate: p,
                prob_accept: prob_accept.min(1.0),
            });
        }
        Ok(curve)
    }

    /// 方案参数检查: c1 >= r1 时第一阶段不存在不确定区
    fn check_stage1_plan(c1: u32, r1: u32) -> EngineResult<()> {
        if c1 >= r1 {
            return Err(EngineError::AcceptRejectOverlap { c1, r1 });
        }
        Ok(())
    }
}

impl Default for DoubleSamplingEngine {
    fn default() -> Self {
        Self::new()
    }
}
