// ==========================================
// 验收抽样决策系统 - 单次抽样评估引擎
// ==========================================
// 职责: 单次方案判定与单阶段 OC 曲线生成
// 输入: 方案参数 (n, c) + 观测不合格数 d
// 输出: 终局判定 / OC 曲线
// ==========================================

use crate::domain::types::Decision;
use crate::engine::binomial::BinomialKernel;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::oc_curve::{OcCurve, OcCurvePoint, OcSweep};

// ==========================================
// SingleSamplingEngine - 单次抽样引擎
// ==========================================
pub struct SingleSamplingEngine {
    // 无状态引擎,不需要注入依赖
}

impl SingleSamplingEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 单次抽样判定
    ///
    /// # 规则
    /// d <= c 接收, d > c 拒收; 单遍完成, 无中间状态
    ///
    /// # 参数
    /// - `sample_size`: 样本量 n
    /// - `acceptance_number`: 接收数 c
    /// - `defects`: 观测不合格数 d (要求 d <= n)
    pub fn decide(
        &self,
        sample_size: u32,
        acceptance_number: u32,
        defects: u32,
    ) -> EngineResult<Decision> {
        if defects > sample_size {
            return Err(EngineError::DefectsExceedSample {
                d: defects,
                n: sample_size,
            });
        }

        if defects <= acceptance_number {
            Ok(Decision::Accept)
        } else {
            Ok(Decision::Reject)
        }
    }

    /// 生成单次方案 OC 曲线
    ///
    /// # 规则
    /// probAccept(p) = P(X <= c), X ~ B(n, p);
    /// 对 p 单调不增, p=0 时为 1, p=1 时除 c >= n 外为 0
    ///
    /// # 参数
    /// - `sample_size`: 样本量 n
    /// - `acceptance_number`: 接收数 c
    /// - `sweep`: p 值扫描配置
    pub fn oc_curve(
        &self,
        sample_size: u32,
        acceptance_number: u32,
        sweep: OcSweep,
    ) -> EngineResult<OcCurve> {
        let n = sample_size as i64;
        // c >= n 时接收概率恒为 1, 截到 n 保持核域合法
        let c = (acceptance_number as i64).min(n);

        let mut curve = Vec::new();
        for p in sweep.rates()? {
            let prob_accept = BinomialKernel::cdf(n, c, p)?;
            curve.push(OcCurvePoint {
                defect_rate: p,
                prob_accept,
            });
        }
        Ok(curve)
    }
}

impl Default for SingleSamplingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_boundary_at_c() {
        let engine = SingleSamplingEngine::new();
        // d = c 恰好接收, d = c+1 拒收
        assert_eq!(engine.decide(50, 2, 2).unwrap(), Decision::Accept);
        assert_eq!(engine.decide(50, 2, 3).unwrap(), Decision::Reject);
    }

    #[test]
    fn test_decide_full_range() {
        let engine = SingleSamplingEngine::new();
        let (n, c) = (20, 4);
        for d in 0..=n {
            let expected = if d <= c { Decision::Accept } else { Decision::Reject };
            assert_eq!(engine.decide(n, c, d).unwrap(), expected, "d={}", d);
        }
    }

    #[test]
    fn test_decide_scenario_n500() {
        // 批量 500, n=50, c=2
        let engine = SingleSamplingEngine::new();
        assert_eq!(engine.decide(50, 2, 3).unwrap(), Decision::Reject);
        assert_eq!(engine.decide(50, 2, 2).unwrap(), Decision::Accept);
    }

    #[test]
    fn test_decide_rejects_defects_over_sample() {
        let engine = SingleSamplingEngine::new();
        assert_eq!(
            engine.decide(50, 2, 51),
            Err(EngineError::DefectsExceedSample { d: 51, n: 50 })
        );
    }

    #[test]
    fn test_oc_curve_endpoints_and_monotone() {
        let engine = SingleSamplingEngine::new();
        let curve = engine.oc_curve(50, 2, OcSweep::default()).unwrap();

        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0].defect_rate, 0.0);
        assert_eq!(curve[0].prob_accept, 1.0);
        assert_eq!(curve.last().unwrap().defect_rate, 1.0);
        assert_eq!(curve.last().unwrap().prob_accept, 0.0);

        for w in curve.windows(2) {
            assert!(w[1].prob_accept <= w[0].prob_accept + 1e-12);
            assert!(w[1].defect_rate > w[0].defect_rate);
        }
    }

    #[test]
    fn test_oc_curve_accept_all_when_c_equals_n() {
        let engine = SingleSamplingEngine::new();
        let curve = engine.oc_curve(10, 10, OcSweep::new(0.25)).unwrap();
        for point in &curve {
            assert_eq!(point.prob_accept, 1.0);
        }
    }

    #[test]
    fn test_oc_curve_known_value() {
        // n=10, c=1, p=0.1: P = 0.9^10 + 10*0.1*0.9^9
        let engine = SingleSamplingEngine::new();
        let curve = engine.oc_curve(10, 1, OcSweep::default()).unwrap();
        let p10 = curve.iter().find(|pt| (pt.defect_rate - 0.1).abs() < 1e-9).unwrap();
        let expected = 0.9_f64.powi(10) + 10.0 * 0.1 * 0.9_f64.powi(9);
        assert!((p10.prob_accept - expected).abs() < 1e-9);
    }
}
