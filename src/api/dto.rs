// ==========================================
// 验收抽样决策系统 - API 请求/响应 DTO
// ==========================================
// 约定: 请求计数字段兼容数字与数字字符串 (表单提交为字符串),
//       统一由校验器解析; 响应字段名沿用前端 camelCase
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::plan::SamplingPlan;
use crate::domain::record::SamplingRecord;

// ==========================================
// 评估请求
// ==========================================

/// 单次抽样评估请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateSingleRequest {
    #[serde(rename = "lotSize")]
    pub lot_size: Option<Value>,
    #[serde(rename = "sampleSize")]
    pub sample_size: Option<Value>,
    #[serde(rename = "acceptanceNumber")]
    pub acceptance_number: Option<Value>,
    #[serde(rename = "defectsObserved")]
    pub defects_observed: Option<Value>,
}

/// 二次抽样第一阶段评估请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateDoubleStage1Request {
    #[serde(rename = "lotSize")]
    pub lot_size: Option<Value>,
    pub n1: Option<Value>,
    pub c1: Option<Value>,
    pub r1: Option<Value>,
    pub d1: Option<Value>,
}

/// 二次抽样第二阶段评估请求 (在第一阶段字段之上补充第二阶段字段)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateDoubleStage2Request {
    #[serde(rename = "lotSize")]
    pub lot_size: Option<Value>,
    pub n1: Option<Value>,
    pub c1: Option<Value>,
    pub r1: Option<Value>,
    pub d1: Option<Value>,
    pub n2: Option<Value>,
    pub c2: Option<Value>,
    pub r2: Option<Value>,
    pub d2: Option<Value>,
}

// ==========================================
// OC 曲线请求
// ==========================================

/// 单次方案 OC 曲线请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcCurveSingleRequest {
    #[serde(rename = "sampleSize")]
    pub sample_size: Option<Value>,
    #[serde(rename = "acceptanceNumber")]
    pub acceptance_number: Option<Value>,
    /// 扫描步长覆写 (缺省用配置值)
    pub step: Option<Value>,
}

/// 二次方案 OC 曲线请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcCurveDoubleRequest {
    pub n1: Option<Value>,
    pub c1: Option<Value>,
    pub r1: Option<Value>,
    pub n2: Option<Value>,
    pub c2: Option<Value>,
    pub step: Option<Value>,
}

// ==========================================
// 评估响应
// ==========================================

/// 评估响应
///
/// # 字段
/// - decision: "Accept" / "Reject" / "Continue"
/// - record_id: 已落库记录的 ID; "Continue" 与第一阶段终局判定不落库, 为 None
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub decision: String,
    #[serde(rename = "recordId")]
    pub record_id: Option<String>,
}

impl EvaluateResponse {
    pub fn decided(decision: String, record_id: Option<String>) -> Self {
        Self {
            decision,
            record_id,
        }
    }

    /// 第一阶段不确定, 提示调用方补采第二阶段数据
    pub fn continue_to_stage2() -> Self {
        Self {
            decision: "Continue".to_string(),
            record_id: None,
        }
    }
}

// ==========================================
// 历史记录列表 DTO
// ==========================================

/// 历史记录行 DTO
///
/// sample_size / acceptance_number / defects_observed 在二次方案下
/// 取第一阶段口径 (n1 / c1 / d1), 其余阶段参数用可选列补充
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingRecordDto {
    pub id: String,
    #[serde(rename = "planType")]
    pub plan_type: String,
    #[serde(rename = "lotSize")]
    pub lot_size: u32,
    #[serde(rename = "sampleSize")]
    pub sample_size: u32,
    #[serde(rename = "acceptanceNumber")]
    pub acceptance_number: u32,
    pub r1: Option<u32>,
    pub n2: Option<u32>,
    pub c2: Option<u32>,
    pub r2: Option<u32>,
    #[serde(rename = "defectsObserved")]
    pub defects_observed: u32,
    #[serde(rename = "defectsStage2")]
    pub defects_stage2: Option<u32>,
    pub decision: String,
    pub date: String,
}

impl From<&SamplingRecord> for SamplingRecordDto {
    fn from(record: &SamplingRecord) -> Self {
        let (r1, n2, c2) = match record.plan {
            SamplingPlan::Single { .. } => (None, None, None),
            SamplingPlan::Double { r1, n2, c2, .. } => (Some(r1), Some(n2), Some(c2)),
        };

        Self {
            id: record.record_id.clone(),
            plan_type: record.plan_type().to_string(),
            lot_size: record.plan.lot_size(),
            sample_size: record.plan.stage1_sample_size(),
            acceptance_number: record.plan.stage1_acceptance_number(),
            r1,
            n2,
            c2,
            r2: record.r2,
            defects_observed: record.outcome.d1,
            defects_stage2: record.outcome.d2,
            decision: record.decision.to_string(),
            date: record.recorded_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::InspectionOutcome;
    use crate::domain::types::Decision;

    #[test]
    fn test_request_accepts_numbers_and_strings() {
        let req: EvaluateSingleRequest = serde_json::from_str(
            r#"{"lotSize": "500", "sampleSize": 50, "acceptanceNumber": "2", "defectsObserved": 3}"#,
        )
        .unwrap();
        assert_eq!(req.lot_size, Some(Value::String("500".to_string())));
        assert_eq!(req.sample_size, Some(Value::from(50)));

        // 缺字段反序列化为 None, 由校验器报错
        let req: EvaluateSingleRequest = serde_json::from_str(r#"{"lotSize": 500}"#).unwrap();
        assert!(req.sample_size.is_none());
    }

    #[test]
    fn test_record_dto_single() {
        let plan = SamplingPlan::Single {
            lot_size: 500,
            sample_size: 50,
            acceptance_number: 2,
        };
        let record = SamplingRecord::new(plan, InspectionOutcome::stage1(3), Decision::Reject);
        let dto = SamplingRecordDto::from(&record);

        assert_eq!(dto.plan_type, "Single");
        assert_eq!(dto.sample_size, 50);
        assert_eq!(dto.acceptance_number, 2);
        assert_eq!(dto.defects_observed, 3);
        assert!(dto.r1.is_none());
        assert_eq!(dto.decision, "Reject");
        assert_eq!(dto.date.len(), 10);

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("planType").is_some());
        assert!(json.get("lotSize").is_some());
        assert!(json.get("defectsObserved").is_some());
    }

    #[test]
    fn test_record_dto_double_uses_stage1_columns() {
        let plan = SamplingPlan::Double {
            lot_size: 500,
            n1: 50,
            c1: 2,
            r1: 5,
            n2: 50,
            c2: 6,
        };
        let record = SamplingRecord::new(
            plan,
            InspectionOutcome::two_stage(3, 2),
            Decision::Accept,
        )
        .with_r2(Some(7));
        let dto = SamplingRecordDto::from(&record);

        assert_eq!(dto.plan_type, "Double");
        assert_eq!(dto.sample_size, 50);
        assert_eq!(dto.acceptance_number, 2);
        assert_eq!(dto.r1, Some(5));
        assert_eq!(dto.n2, Some(50));
        assert_eq!(dto.c2, Some(6));
        assert_eq!(dto.r2, Some(7));
        assert_eq!(dto.defects_observed, 3);
        assert_eq!(dto.defects_stage2, Some(2));
    }
}
