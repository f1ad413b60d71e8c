// ==========================================
// 验收抽样决策系统 - 二项分布概率核
// ==========================================
// 职责: 精确的二项分布点概率/累积概率计算
// 红线: 无状态、无副作用、无 I/O 操作
// 数值: 对数空间计算, n 达数百时不溢出
// ==========================================

use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// BinomialKernel - 概率核
// ==========================================
pub struct BinomialKernel;

impl BinomialKernel {
    /// 二项分布点概率 P(X = k), X ~ B(n, p)
    ///
    /// # 参数
    /// - n: 试验数 (n >= 0)
    /// - k: 成功数 (0 <= k <= n)
    /// - p: 单次成功概率 (0 <= p <= 1)
    ///
    /// # 返回
    /// - f64: 点概率
    ///
    /// # 错误
    /// 参数为负、k > n 或 p 越界时返回域错误, 不做静默截断
    pub fn pmf(n: i64, k: i64, p: f64) -> EngineResult<f64> {
        Self::check_domain(n, k, p)?;

        // 端点概率不进对数空间, 避免 ln(0)
        if p == 0.0 {
            return Ok(if k == 0 { 1.0 } else { 0.0 });
        }
        if p == 1.0 {
            return Ok(if k == n { 1.0 } else { 0.0 });
        }

        let nf = n as f64;
        let kf = k as f64;
        let log_pmf =
            ln_binomial_coef(n, k) + kf * p.ln() + (nf - kf) * (1.0 - p).ln();
        Ok(log_pmf.exp())
    }

    /// 二项分布累积概率 P(X <= k), X ~ B(n, p)
    ///
    /// # 参数
    /// - n: 试验数 (n >= 0)
    /// - k: 成功数上界 (0 <= k <= n)
    /// - p: 单次成功概率 (0 <= p <= 1)
    ///
    /// # 返回
    /// - f64: 累积概率; p=0 时恒为 1, p=1 时 k<n 为 0 / k=n 为 1
    pub fn cdf(n: i64, k: i64, p: f64) -> EngineResult<f64> {
        Self::check_domain(n, k, p)?;

        if p == 0.0 {
            return Ok(1.0);
        }
        if p == 1.0 {
            return Ok(if k == n { 1.0 } else { 0.0 });
        }

        // 逐项累加对数空间点概率, 浮点和截到 1.0
        let mut acc = 0.0;
        for i in 0..=k {
            acc += Self::pmf(n, i, p)?;
        }
        Ok(acc.min(1.0))
    }

    /// 域检查: 负参数、k > n、p 越界均为契约违反
    fn check_domain(n: i64, k: i64, p: f64) -> EngineResult<()> {
        if n < 0 || k < 0 {
            return Err(EngineError::NegativeArgument { n, k });
        }
        if k > n {
            return Err(EngineError::SuccessesExceedTrials { k, n });
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::ProbabilityOutOfRange(p));
        }
        Ok(())
    }
}

/// 组合数的自然对数 ln C(n, k) = lnΓ(n+1) - lnΓ(k+1) - lnΓ(n-k+1)
fn ln_binomial_coef(n: i64, k: i64) -> f64 {
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// ln Γ(x), Lanczos 近似 (g=7, 9 项系数)
///
/// 参考: Numerical Recipes 6.1; 对 x >= 0.5 直接求值,
/// x < 0.5 走反射公式保证全域可用
fn ln_gamma(x: f64) -> f64 {
    const LANCZOS_COEF: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    const LANCZOS_G: f64 = 7.0;

    let pi = std::f64::consts::PI;
    if x < 0.5 {
        // 反射公式: ln Γ(x) = ln(π / sin(πx)) - ln Γ(1-x)
        (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut acc = LANCZOS_COEF[0];
        for (i, &coef) in LANCZOS_COEF.iter().enumerate().skip(1) {
            acc += coef / (x + i as f64);
        }
        let t = x + LANCZOS_G + 0.5;
        0.5 * (2.0 * pi).ln() + (x + 0.5) * t.ln() - t + acc.ln()
    }
}
