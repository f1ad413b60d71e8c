// ==========================================
// 验收抽样决策系统 - 方案参数校验器
// ==========================================
// 职责: 请求字段的存在性与数值解析校验
// 约定: 表单提交的计数字段可能是数字字符串, 这里统一解析;
//       语义校验 (d<=n, c1<r1) 由引擎层负责, 不在此重复
// ==========================================

use serde_json::Value;

use crate::api::dto::{
    EvaluateDoubleStage1Request, EvaluateDoubleStage2Request, EvaluateSingleRequest,
    OcCurveDoubleRequest, OcCurveSingleRequest,
};
use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::plan::SamplingPlan;

// ==========================================
// 校验结果载体
// ==========================================

/// 第一阶段评估参数 (此时尚无 n2/c2, 不构成完整方案)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage1Params {
    pub lot_size: u32,
    pub n1: u32,
    pub c1: u32,
    pub r1: u32,
    pub d1: u32,
}

/// 第二阶段评估参数
#[derive(Debug, Clone, PartialEq)]
pub struct Stage2Params {
    pub plan: SamplingPlan,
    pub d1: u32,
    pub d2: u32,
    pub r2: Option<u32>,
}

// ==========================================
// PlanParamValidator - 方案参数校验器
// ==========================================

/// 方案参数校验器
///
/// 职责：
/// 1. 必填字段存在性检查 (缺失/空串/null 均视为缺失)
/// 2. 数字与数字字符串统一解析为非负整数
/// 3. 抽样量不超过批量 (n <= N)
pub struct PlanParamValidator;

impl PlanParamValidator {
    /// 校验单次抽样评估请求
    pub fn validate_single(req: &EvaluateSingleRequest) -> ApiResult<(SamplingPlan, u32)> {
        let mut violations = Vec::new();

        let lot_size = parse_count(&mut violations, "lotSize", &req.lot_size);
        let sample_size = parse_count(&mut violations, "sampleSize", &req.sample_size);
        let acceptance_number =
            parse_count(&mut violations, "acceptanceNumber", &req.acceptance_number);
        let defects = parse_count(&mut violations, "defectsObserved", &req.defects_observed);

        if let (Some(n), Some(lot)) = (sample_size, lot_size) {
            check_sample_within_lot(&mut violations, "sampleSize", n, lot);
        }

        ensure_no_violations(violations)?;

        let plan = SamplingPlan::Single {
            lot_size: lot_size.unwrap_or_default(),
            sample_size: sample_size.unwrap_or_default(),
            acceptance_number: acceptance_number.unwrap_or_default(),
        };
        Ok((plan, defects.unwrap_or_default()))
    }

    /// 校验二次抽样第一阶段评估请求
    pub fn validate_double_stage1(req: &EvaluateDoubleStage1Request) -> ApiResult<Stage1Params> {
        let mut violations = Vec::new();

        let lot_size = parse_count(&mut violations, "lotSize", &req.lot_size);
        let n1 = parse_count(&mut violations, "n1", &req.n1);
        let c1 = parse_count(&mut violations, "c1", &req.c1);
        let r1 = parse_count(&mut violations, "r1", &req.r1);
        let d1 = parse_count(&mut violations, "d1", &req.d1);

        if let (Some(n), Some(lot)) = (n1, lot_size) {
            check_sample_within_lot(&mut violations, "n1", n, lot);
        }

        ensure_no_violations(violations)?;

        Ok(Stage1Params {
            lot_size: lot_size.unwrap_or_default(),
            n1: n1.unwrap_or_default(),
            c1: c1.unwrap_or_default(),
            r1: r1.unwrap_or_default(),
            d1: d1.unwrap_or_default(),
        })
    }

    /// 校验二次抽样第二阶段评估请求
    pub fn validate_double_stage2(req: &EvaluateDoubleStage2Request) -> ApiResult<Stage2Params> {
        let mut violations = Vec::new();

        let lot_size = parse_count(&mut violations, "lotSize", &req.lot_size);
        let n1 = parse_count(&mut violations, "n1", &req.n1);
        let c1 = parse_count(&mut violations, "c1", &req.c1);
        let r1 = parse_count(&mut violations, "r1", &req.r1);
        let d1 = parse_count(&mut violations, "d1", &req.d1);
        let n2 = parse_count(&mut violations, "n2", &req.n2);
        let c2 = parse_count(&mut violations, "c2", &req.c2);
        let d2 = parse_count(&mut violations, "d2", &req.d2);
        // r2 仅备查, 缺失不算违规
        let r2 = parse_optional_count(&mut violations, "r2", &req.r2);

        if let (Some(n), Some(lot)) = (n1, lot_size) {
            check_sample_within_lot(&mut violations, "n1", n, lot);
        }
        if let (Some(n), Some(lot)) = (n2, lot_size) {
            check_sample_within_lot(&mut violations, "n2", n, lot);
        }

        ensure_no_violations(violations)?;

        let plan = SamplingPlan::Double {
            lot_size: lot_size.unwrap_or_default(),
            n1: n1.unwrap_or_default(),
            c1: c1.unwrap_or_default(),
            r1: r1.unwrap_or_default(),
            n2: n2.unwrap_or_default(),
            c2: c2.unwrap_or_default(),
        };
        Ok(Stage2Params {
            plan,
            d1: d1.unwrap_or_default(),
            d2: d2.unwrap_or_default(),
            r2,
        })
    }

    /// 校验单次方案 OC 曲线请求
    ///
    /// # 返回
    /// - (sample_size, acceptance_number, step覆写)
    pub fn validate_oc_single(req: &OcCurveSingleRequest) -> ApiResult<(u32, u32, Option<f64>)> {
        let mut violations = Vec::new();

        let sample_size = parse_count(&mut violations, "sampleSize", &req.sample_size);
        let acceptance_number =
            parse_count(&mut violations, "acceptanceNumber", &req.acceptance_number);
        let step = parse_step(&mut violations, &req.step);

        ensure_no_violations(violations)?;

        Ok((
            sample_size.unwrap_or_default(),
            acceptance_number.unwrap_or_default(),
            step,
        ))
    }

    /// 校验二次方案 OC 曲线请求
    ///
    /// # 返回
    /// - (n1, c1, r1, n2, c2, step覆写)
    #[allow(clippy::type_complexity)]
    pub fn validate_oc_double(
        req: &OcCurveDoubleRequest,
    ) -> ApiResult<(u32, u32, u32, u32, u32, Option<f64>)> {
        let mut violations = Vec::new();

        let n1 = parse_count(&mut violations, "n1", &req.n1);
        let c1 = parse_count(&mut violations, "c1", &req.c1);
        let r1 = parse_count(&mut violations, "r1", &req.r1);
        let n2 = parse_count(&mut violations, "n2", &req.n2);
        let c2 = parse_count(&mut violations, "c2", &req.c2);
        let step = parse_step(&mut violations, &req.step);

        ensure_no_violations(violations)?;

        Ok((
            n1.unwrap_or_default(),
            c1.unwrap_or_default(),
            r1.unwrap_or_default(),
            n2.unwrap_or_default(),
            c2.unwrap_or_default(),
            step,
        ))
    }
}

// ==========================================
// 字段解析辅助函数
// ==========================================

/// 解析必填计数字段 (数字或数字字符串, 非负整数)
fn parse_count(
    violations: &mut Vec<ValidationViolation>,
    field: &str,
    value: &Option<Value>,
) -> Option<u32> {
    let raw = match value {
        None | Some(Value::Null) => {
            push_violation(violations, "MISSING_FIELD", field, "缺少必填字段", None);
            return None;
        }
        Some(v) => v,
    };
    parse_count_value(violations, field, raw)
}

/// 解析可选计数字段 (缺失合法, 给了就必须是非负整数)
fn parse_optional_count(
    violations: &mut Vec<ValidationViolation>,
    field: &str,
    value: &Option<Value>,
) -> Option<u32> {
    let raw = match value {
        None | Some(Value::Null) => return None,
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(v) => v,
    };
    parse_count_value(violations, field, raw)
}

fn parse_count_value(
    violations: &mut Vec<ValidationViolation>,
    field: &str,
    raw: &Value,
) -> Option<u32> {
    match raw {
        Value::Number(n) => match n.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => Some(v),
            None => {
                push_violation(
                    violations,
                    "NOT_A_COUNT",
                    field,
                    &format!("不是非负整数: {}", n),
                    Some(serde_json::json!({ "raw": raw })),
                );
                None
            }
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                push_violation(violations, "MISSING_FIELD", field, "字段为空字符串", None);
                return None;
            }
            match trimmed.parse::<u32>() {
                Ok(v) => Some(v),
                Err(_) => {
                    push_violation(
                        violations,
                        "NOT_A_COUNT",
                        field,
                        &format!("不是非负整数: {}", trimmed),
                        Some(serde_json::json!({ "raw": raw })),
                    );
                    None
                }
            }
        }
        _ => {
            push_violation(
                violations,
                "NOT_A_COUNT",
                field,
                "字段类型必须是数字或数字字符串",
                Some(serde_json::json!({ "raw": raw })),
            );
            None
        }
    }
}

/// 解析可选的扫描步长覆写 (缺失/空串返回 None, 用配置默认值)
///
/// 步长的取值范围校验由 OcSweep 负责, 这里只负责解析
fn parse_step(violations: &mut Vec<ValidationViolation>, value: &Option<Value>) -> Option<f64> {
    let raw = match value {
        None | Some(Value::Null) => return None,
        Some(v) => v,
    };
    match raw {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Some(f),
            None => {
                push_violation(violations, "NOT_A_NUMBER", "step", "步长无法解析为数值", None);
                None
            }
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(f) => Some(f),
                Err(_) => {
                    push_violation(
                        violations,
                        "NOT_A_NUMBER",
                        "step",
                        &format!("步长无法解析为数值: {}", trimmed),
                        None,
                    );
                    None
                }
            }
        }
        _ => {
            push_violation(
                violations,
                "NOT_A_NUMBER",
                "step",
                "步长类型必须是数字或数字字符串",
                None,
            );
            None
        }
    }
}

fn check_sample_within_lot(
    violations: &mut Vec<ValidationViolation>,
    field: &str,
    sample: u32,
    lot: u32,
) {
    if sample > lot {
        push_violation(
            violations,
            "SAMPLE_EXCEEDS_LOT",
            field,
            &format!("抽样量{}超过批量{}", sample, lot),
            Some(serde_json::json!({ "sample": sample, "lotSize": lot })),
        );
    }
}

fn push_violation(
    violations: &mut Vec<ValidationViolation>,
    violation_type: &str,
    field: &str,
    reason: &str,
    details: Option<Value>,
) {
    violations.push(ValidationViolation {
        violation_type: violation_type.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
        details,
    });
}

fn ensure_no_violations(violations: Vec<ValidationViolation>) -> ApiResult<()> {
    if !violations.is_empty() {
        return Err(ApiError::PlanValidationError {
            reason: format!("{}个字段校验失败", violations.len()),
            violations,
        });
    }
    Ok(())
}
