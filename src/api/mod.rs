// ==========================================
// 验收抽样决策系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供上层调用
// ==========================================

pub mod dto;
pub mod error;
pub mod export;
pub mod report_api;
pub mod sampling_api;
pub mod validator;

// 重导出核心类型
pub use dto::{
    EvaluateDoubleStage1Request, EvaluateDoubleStage2Request, EvaluateResponse,
    EvaluateSingleRequest, OcCurveDoubleRequest, OcCurveSingleRequest, SamplingRecordDto,
};
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use export::RecordCsvExporter;
pub use report_api::{ComparisonReport, ReportApi};
pub use sampling_api::SamplingApi;
pub use validator::PlanParamValidator;
