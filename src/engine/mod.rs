// ==========================================
// 验收抽样决策系统 - 引擎层
// ==========================================
// 职责: 抽样判定与 OC 曲线的纯计算引擎
// 红线: Engine 不做 I/O, 不持有共享可变状态;
//       同一输入永远给出同一输出
// ==========================================

pub mod aggregator;
pub mod binomial;
pub mod double;
pub mod error;
pub mod oc_curve;
pub mod single;

// 重导出核心引擎
pub use aggregator::{CurveAggregator, MergedCurvePoint, DEFAULT_MERGE_TOLERANCE};
pub use binomial::BinomialKernel;
pub use double::DoubleSamplingEngine;
pub use error::{EngineError, EngineResult};
pub use oc_curve::{OcCurve, OcCurvePoint, OcSweep, DEFAULT_SWEEP_STEP, MIN_SWEEP_STEP};
pub use single::SingleSamplingEngine;
