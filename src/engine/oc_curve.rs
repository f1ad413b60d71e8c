// ==========================================
// 验收抽样决策系统 - OC 曲线数据类型与扫描网格
// ==========================================
// 职责: 曲线点定义与 p 值扫描序列构造
// 约定: 扫描自 0 到 1 双端含, 默认步长 0.01;
//       网格按整数步数乘法生成, 不做浮点累加
// ==========================================

use serde::{Deserialize, Serialize};

use crate::engine::error::{EngineError, EngineResult};

/// 默认扫描步长
pub const DEFAULT_SWEEP_STEP: f64 = 0.01;

/// 允许的最小扫描步长 (限制单条曲线的点数上限)
pub const MIN_SWEEP_STEP: f64 = 1e-6;

// ==========================================
// OcCurvePoint - 曲线点
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcCurvePoint {
    #[serde(rename = "defectRate")]
    pub defect_rate: f64, // 真实批不合格率 p
    #[serde(rename = "probAccept")]
    pub prob_accept: f64, // 接收概率 P(p)
}

/// OC 曲线: 按 defect_rate 严格递增排列的点序列,
/// 纯由方案参数决定, 可随时重算
pub type OcCurve = Vec<OcCurvePoint>;

// ==========================================
// OcSweep - 扫描配置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcSweep {
    pub step: f64, // p 值扫描步长
}

impl OcSweep {
    /// 指定步长的扫描配置
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    /// 生成 p 值序列: [0, step, 2*step, ..., 1.0]
    ///
    /// 末点恒为 1.0; 步长除不尽 1 时最后一段缩短
    pub fn rates(&self) -> EngineResult<Vec<f64>> {
        if !self.step.is_finite() || self.step <= 0.0 || self.step > 1.0 || self.step < MIN_SWEEP_STEP
        {
            return Err(EngineError::InvalidSweepStep(self.step));
        }

        let mut rates = Vec::new();
        let mut i: u64 = 0;
        loop {
            let p = i as f64 * self.step;
            if p >= 1.0 - 1e-12 {
                break;
            }
            rates.push(p);
            i += 1;
        }
        rates.push(1.0);
        Ok(rates)
    }
}

impl Default for OcSweep {
    fn default() -> Self {
        Self {
            step: DEFAULT_SWEEP_STEP,
        }
    }
}
