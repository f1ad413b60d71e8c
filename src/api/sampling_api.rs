// ==========================================
// 验收抽样决策系统 - 抽样评估 API
// ==========================================
// 职责: 评估请求的校验、判定、落库与历史记录查询
// 架构: API 层 → 引擎层 (纯计算) → 仓储层 (落库)
// 约定: 只有终局判定且方案快照完整时才写入记录
// ==========================================

use std::sync::Arc;

use crate::api::dto::{
    EvaluateDoubleStage1Request, EvaluateDoubleStage2Request, EvaluateResponse,
    EvaluateSingleRequest, OcCurveDoubleRequest, OcCurveSingleRequest, SamplingRecordDto,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::PlanParamValidator;
use crate::config::{config_keys, ConfigManager};
use crate::domain::record::{InspectionOutcome, SamplingRecord};
use crate::engine::{
    DoubleSamplingEngine, OcCurve, OcSweep, SingleSamplingEngine, DEFAULT_SWEEP_STEP,
};
use crate::repository::record_repo::SamplingRecordRepository;

// ==========================================
// SamplingApi - 抽样评估 API
// ==========================================

/// 抽样评估API
///
/// 职责：
/// 1. 单次/二次方案的判定评估 (含第一阶段过渡应答 "Continue")
/// 2. 按需生成方案的 OC 曲线
/// 3. 历史评估记录的查询与删除
pub struct SamplingApi {
    single_engine: SingleSamplingEngine,
    double_engine: DoubleSamplingEngine,
    record_repo: Arc<SamplingRecordRepository>,
    config: Arc<ConfigManager>,
}

impl SamplingApi {
    /// 创建新的 SamplingApi 实例
    pub fn new(record_repo: Arc<SamplingRecordRepository>, config: Arc<ConfigManager>) -> Self {
        Self {
            single_engine: SingleSamplingEngine::new(),
            double_engine: DoubleSamplingEngine::new(),
            record_repo,
            config,
        }
    }

    // ==========================================
    // 评估接口
    // ==========================================

    /// 单次抽样评估
    ///
    /// # 参数
    /// - request: 单次抽样评估请求 (计数字段兼容数字字符串)
    ///
    /// # 返回
    /// - Ok(EvaluateResponse): 终局判定 + 已落库记录 ID
    /// - Err(ApiError): 校验失败或判定失败
    pub fn evaluate_single(&self, request: EvaluateSingleRequest) -> ApiResult<EvaluateResponse> {
        let (plan, defects) = PlanParamValidator::validate_single(&request)?;

        let decision = self.single_engine.decide(
            plan.stage1_sample_size(),
            plan.stage1_acceptance_number(),
            defects,
        )?;

        let record = SamplingRecord::new(plan, InspectionOutcome::stage1(defects), decision);
        self.record_repo.insert(&record)?;

        tracing::info!(
            record_id = %record.record_id,
            plan = %record.plan.curve_key(),
            defects = defects,
            decision = %decision,
            "单次抽样评估完成"
        );

        Ok(EvaluateResponse::decided(
            decision.to_string(),
            Some(record.record_id),
        ))
    }

    /// 二次抽样第一阶段评估
    ///
    /// # 返回
    /// - decision = "Accept"/"Reject": 第一阶段终局
    /// - decision = "Continue": 不确定, 调用方须补采第二阶段数据后调 evaluate_double_stage2
    ///
    /// # 说明
    /// 第一阶段请求不含 n2/c2, 无完整方案快照可存, 因此不落库
    pub fn evaluate_double_stage1(
        &self,
        request: EvaluateDoubleStage1Request,
    ) -> ApiResult<EvaluateResponse> {
        let params = PlanParamValidator::validate_double_stage1(&request)?;

        let outcome =
            self.double_engine
                .decide_stage1(params.n1, params.c1, params.r1, params.d1)?;

        match outcome.to_decision() {
            Some(decision) => {
                tracing::info!(
                    n1 = params.n1,
                    c1 = params.c1,
                    r1 = params.r1,
                    d1 = params.d1,
                    decision = %decision,
                    "二次抽样第一阶段终局"
                );
                Ok(EvaluateResponse::decided(decision.to_string(), None))
            }
            None => {
                tracing::info!(
                    n1 = params.n1,
                    c1 = params.c1,
                    r1 = params.r1,
                    d1 = params.d1,
                    "二次抽样第一阶段不确定, 等待第二阶段数据"
                );
                Ok(EvaluateResponse::continue_to_stage2())
            }
        }
    }

    /// 二次抽样第二阶段评估 (仅在第一阶段返回 "Continue" 后可达)
    pub fn evaluate_double_stage2(
        &self,
        request: EvaluateDoubleStage2Request,
    ) -> ApiResult<EvaluateResponse> {
        let params = PlanParamValidator::validate_double_stage2(&request)?;
        let (n1, c1, r1, n2, c2) = match params.plan {
            crate::domain::plan::SamplingPlan::Double {
                n1, c1, r1, n2, c2, ..
            } => (n1, c1, r1, n2, c2),
            // validate_double_stage2 只构造 Double 变体
            _ => return Err(ApiError::InternalError("二次评估得到非二次方案".to_string())),
        };

        let decision = self
            .double_engine
            .decide_stage2(n1, c1, r1, n2, c2, params.d1, params.d2)?;

        let record = SamplingRecord::new(
            params.plan,
            InspectionOutcome::two_stage(params.d1, params.d2),
            decision,
        )
        .with_r2(params.r2);
        self.record_repo.insert(&record)?;

        tracing::info!(
            record_id = %record.record_id,
            plan = %record.plan.curve_key(),
            d1 = params.d1,
            d2 = params.d2,
            decision = %decision,
            "二次抽样第二阶段评估完成"
        );

        Ok(EvaluateResponse::decided(
            decision.to_string(),
            Some(record.record_id),
        ))
    }

    // ==========================================
    // OC 曲线接口
    // ==========================================

    /// 单次方案 OC 曲线
    pub fn oc_curve_single(&self, request: OcCurveSingleRequest) -> ApiResult<OcCurve> {
        let (sample_size, acceptance_number, step) =
            PlanParamValidator::validate_oc_single(&request)?;
        let sweep = self.resolve_sweep(step)?;

        let curve = self
            .single_engine
            .oc_curve(sample_size, acceptance_number, sweep)?;
        Ok(curve)
    }

    /// 二次方案 OC 曲线
    pub fn oc_curve_double(&self, request: OcCurveDoubleRequest) -> ApiResult<OcCurve> {
        let (n1, c1, r1, n2, c2, step) = PlanParamValidator::validate_oc_double(&request)?;
        let sweep = self.resolve_sweep(step)?;

        let curve = self.double_engine.oc_curve(n1, c1, r1, n2, c2, sweep)?;
        Ok(curve)
    }

    // ==========================================
    // 历史记录接口
    // ==========================================

    /// 查询最近的评估记录
    ///
    /// # 参数
    /// - limit: 返回条数上限, 缺省用配置的页大小
    pub fn list_records(&self, limit: Option<u32>) -> ApiResult<Vec<SamplingRecordDto>> {
        let limit = match limit {
            Some(v) => v,
            None => self
                .config
                .get_record_page_size()
                .map_err(|e| ApiError::InternalError(format!("读取页大小配置失败: {}", e)))?,
        };

        let records = self.record_repo.list_recent(limit)?;
        Ok(records.iter().map(SamplingRecordDto::from).collect())
    }

    /// 按 ID 查询评估记录
    pub fn get_record(&self, record_id: &str) -> ApiResult<SamplingRecordDto> {
        if record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }

        let record = self
            .record_repo
            .get_by_id(record_id)?
            .ok_or_else(|| ApiError::NotFound(format!("sampling_record(id={})不存在", record_id)))?;
        Ok(SamplingRecordDto::from(&record))
    }

    /// 按 ID 删除评估记录
    pub fn delete_record(&self, record_id: &str) -> ApiResult<()> {
        if record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }

        self.record_repo.delete_by_id(record_id)?;
        tracing::info!(record_id = %record_id, "评估记录已删除");
        Ok(())
    }

    /// 解析扫描步长: 请求覆写优先, 其次配置, 最后默认值
    fn resolve_sweep(&self, step_override: Option<f64>) -> ApiResult<OcSweep> {
        let step = match step_override {
            Some(step) => step,
            None => self
                .config
                .get_global_config_value(config_keys::OC_SWEEP_STEP)
                .map_err(|e| ApiError::InternalError(format!("读取扫描步长配置失败: {}", e)))?
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(DEFAULT_SWEEP_STEP),
        };
        Ok(OcSweep::new(step))
    }
}
