// ==========================================
// 抽样评估 API 端到端测试
// ==========================================
// 测试目标: 通过 AppState 装配走完整评估链路
//   校验 → 判定 → 落库 → 查询 → 导出 → 删除
// ==========================================


use acceptance_sampling::api::dto::{
    EvaluateDoubleStage1Request, EvaluateDoubleStage2Request, EvaluateSingleRequest,
    OcCurveDoubleRequest, OcCurveSingleRequest,
};
use acceptance_sampling::api::{ApiError, RecordCsvExporter};
use acceptance_sampling::app::AppState;
use serde_json::Value;
use test_helpers::create_test_db;

fn num(v: u64) -> Option<Value> {
    Some(Value::from(v))
}

fn text(s: &str) -> Option<Value> {
    Some(Value::String(s.to_string()))
}

fn create_app() -> (tempfile::NamedTempFile, AppState) {
    let (file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    (file, state)
}

#[test]
fn test_single_evaluation_full_flow() {
    let (_file, state) = create_app();

    // 评估: N=500, n=50, c=2, d=3 → 拒收
    let response = state
        .sampling_api
        .evaluate_single(EvaluateSingleRequest {
            lot_size: num(500),
            sample_size: num(50),
            acceptance_number: num(2),
            defects_observed: num(3),
        })
        .unwrap();
    assert_eq!(response.decision, "Reject");
    let record_id = response.record_id.unwrap();

    // 查询
    let dto = state.sampling_api.get_record(&record_id).unwrap();
    assert_eq!(dto.plan_type, "Single");
    assert_eq!(dto.lot_size, 500);
    assert_eq!(dto.sample_size, 50);
    assert_eq!(dto.defects_observed, 3);

    // 列表
    let list = state.sampling_api.list_records(None).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, record_id);

    // 删除后不可见
    state.sampling_api.delete_record(&record_id).unwrap();
    assert!(matches!(
        state.sampling_api.get_record(&record_id).unwrap_err(),
        ApiError::NotFound(_)
    ));
}

#[test]
fn test_double_evaluation_continue_then_stage2() {
    let (_file, state) = create_app();

    // 第一阶段: d1=3 落入不确定区, 不落库
    let stage1 = state
        .sampling_api
        .evaluate_double_stage1(EvaluateDoubleStage1Request {
            lot_size: num(500),
            n1: num(50),
            c1: num(2),
            r1: num(5),
            d1: num(3),
        })
        .unwrap();
    assert_eq!(stage1.decision, "Continue");
    assert!(stage1.record_id.is_none());
    assert!(state.sampling_api.list_records(None).unwrap().is_empty());

    // 第二阶段: 累计 3+2=5 <= 6 → 接收并落库完整方案
    let stage2 = state
        .sampling_api
        .evaluate_double_stage2(EvaluateDoubleStage2Request {
            lot_size: num(500),
            n1: num(50),
            c1: num(2),
            r1: num(5),
            d1: num(3),
            n2: num(50),
            c2: num(6),
            r2: num(7),
            d2: num(2),
        })
        .unwrap();
    assert_eq!(stage2.decision, "Accept");

    let dto = state
        .sampling_api
        .get_record(&stage2.record_id.unwrap())
        .unwrap();
    assert_eq!(dto.plan_type, "Double");
    assert_eq!(dto.r1, Some(5));
    assert_eq!(dto.n2, Some(50));
    assert_eq!(dto.c2, Some(6));
    assert_eq!(dto.r2, Some(7));
    assert_eq!(dto.defects_observed, 3);
    assert_eq!(dto.defects_stage2, Some(2));
}

#[test]
fn test_double_stage2_reject_when_cumulative_exceeds() {
    let (_file, state) = create_app();

    // 累计 3+5=8 > 6 → 拒收
    let response = state
        .sampling_api
        .evaluate_double_stage2(EvaluateDoubleStage2Request {
            lot_size: num(500),
            n1: num(50),
            c1: num(2),
            r1: num(5),
            d1: num(3),
            n2: num(50),
            c2: num(6),
            r2: None,
            d2: num(5),
        })
        .unwrap();
    assert_eq!(response.decision, "Reject");
}

#[test]
fn test_form_string_inputs_accepted() {
    let (_file, state) = create_app();

    let response = state
        .sampling_api
        .evaluate_single(EvaluateSingleRequest {
            lot_size: text("500"),
            sample_size: text(" 50 "),
            acceptance_number: text("2"),
            defects_observed: text("2"),
        })
        .unwrap();
    assert_eq!(response.decision, "Accept");
}

#[test]
fn test_validation_failures_name_fields() {
    let (_file, state) = create_app();

    let err = state
        .sampling_api
        .evaluate_single(EvaluateSingleRequest {
            lot_size: num(40),
            sample_size: num(50), // n > N
            acceptance_number: None,
            defects_observed: text("many"),
        })
        .unwrap_err();

    match err {
        ApiError::PlanValidationError { violations, .. } => {
            assert!(violations.iter().any(|v| v.field == "acceptanceNumber"));
            assert!(violations.iter().any(|v| v.field == "defectsObserved"));
            assert!(violations
                .iter()
                .any(|v| v.violation_type == "SAMPLE_EXCEEDS_LOT"));
        }
        other => panic!("Expected PlanValidationError, got {:?}", other),
    }
    // 校验失败的请求不落库
    assert!(state.sampling_api.list_records(None).unwrap().is_empty());
}

#[test]
fn test_oc_curve_requests() {
    let (_file, state) = create_app();

    let single = state
        .sampling_api
        .oc_curve_single(OcCurveSingleRequest {
            sample_size: num(50),
            acceptance_number: num(2),
            step: None,
        })
        .unwrap();
    assert_eq!(single.len(), 101);
    assert!((single[0].prob_accept - 1.0).abs() < 1e-12);

    let double = state
        .sampling_api
        .oc_curve_double(OcCurveDoubleRequest {
            n1: num(50),
            c1: num(2),
            r1: num(5),
            n2: num(50),
            c2: num(6),
            step: text("0.1"),
        })
        .unwrap();
    assert_eq!(double.len(), 11);

    // 配置的步长在无覆写时生效
    state
        .config_manager
        .set_global_config_value("oc_sweep_step", "0.05")
        .unwrap();
    let configured = state
        .sampling_api
        .oc_curve_single(OcCurveSingleRequest {
            sample_size: num(50),
            acceptance_number: num(2),
            step: None,
        })
        .unwrap();
    assert_eq!(configured.len(), 21);
}

#[test]
fn test_export_records_to_csv() {
    let (_file, state) = create_app();

    state
        .sampling_api
        .evaluate_single(EvaluateSingleRequest {
            lot_size: num(500),
            sample_size: num(50),
            acceptance_number: num(2),
            defects_observed: num(3),
        })
        .unwrap();
    state
        .sampling_api
        .evaluate_double_stage2(EvaluateDoubleStage2Request {
            lot_size: num(1000),
            n1: num(50),
            c1: num(2),
            r1: num(5),
            d1: num(3),
            n2: num(50),
            c2: num(6),
            r2: None,
            d2: num(2),
        })
        .unwrap();

    let records = state.record_repo.list_recent(100).unwrap();
    let csv = RecordCsvExporter::export_to_string(&records).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Plan,LotSize,SampleSize,AcceptanceNo,Defects,Decision,Date"
    );
    assert!(lines.iter().any(|l| l.starts_with("Single,500,50,2,3,Reject,")));
    assert!(lines.iter().any(|l| l.starts_with("Double,1000,50,2,3,Accept,")));
}
