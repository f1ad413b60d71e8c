// ==========================================
// OC 曲线扫描网格集成测试
// ==========================================
// 测试目标: 两类引擎共用同一扫描网格, 端点与步长口径一致
// ==========================================

use acceptance_sampling::engine::{
    DoubleSamplingEngine, EngineError, OcSweep, SingleSamplingEngine, DEFAULT_SWEEP_STEP,
};

#[test]
fn test_engines_share_identical_grid() {
    let sweep = OcSweep::new(0.02);
    let single = SingleSamplingEngine::new().oc_curve(50, 2, sweep).unwrap();
    let double = DoubleSamplingEngine::new()
        .oc_curve(50, 2, 5, 50, 6, sweep)
        .unwrap();

    assert_eq!(single.len(), double.len());
    for (s, d) in single.iter().zip(double.iter()) {
        assert_eq!(s.defect_rate, d.defect_rate);
    }
}

#[test]
fn test_default_sweep_covers_unit_interval() {
    let curve = SingleSamplingEngine::new()
        .oc_curve(50, 2, OcSweep::default())
        .unwrap();
    assert_eq!(curve.len(), 101);
    assert_eq!(curve[0].defect_rate, 0.0);
    assert_eq!(curve.last().unwrap().defect_rate, 1.0);
    assert!((curve[50].defect_rate - 0.5).abs() < 1e-12);
    assert!((DEFAULT_SWEEP_STEP - 0.01).abs() < 1e-15);
}

#[test]
fn test_uneven_step_keeps_terminal_point() {
    // 0.3 除不尽 1: 0, 0.3, 0.6, 0.9, 1.0
    let curve = SingleSamplingEngine::new()
        .oc_curve(10, 1, OcSweep::new(0.3))
        .unwrap();
    assert_eq!(curve.len(), 5);
    assert_eq!(curve.last().unwrap().defect_rate, 1.0);
    assert_eq!(curve.last().unwrap().prob_accept, 0.0);
}

#[test]
fn test_invalid_steps_rejected_by_both_engines() {
    for step in [0.0, -0.01, 1.5, f64::NAN] {
        assert!(matches!(
            SingleSamplingEngine::new().oc_curve(50, 2, OcSweep::new(step)),
            Err(EngineError::InvalidSweepStep(_))
        ));
        assert!(matches!(
            DoubleSamplingEngine::new().oc_curve(50, 2, 5, 50, 6, OcSweep::new(step)),
            Err(EngineError::InvalidSweepStep(_))
        ));
    }
}

#[test]
fn test_single_item_sample_is_linear() {
    // n=1, c=0: P(p) = 1 - p
    let curve = SingleSamplingEngine::new()
        .oc_curve(1, 0, OcSweep::new(0.25))
        .unwrap();
    for point in &curve {
        assert!((point.prob_accept - (1.0 - point.defect_rate)).abs() < 1e-12);
    }
}

#[test]
fn test_curve_points_serialize_camel_case() {
    let curve = SingleSamplingEngine::new()
        .oc_curve(10, 1, OcSweep::new(0.5))
        .unwrap();
    let json = serde_json::to_value(&curve).unwrap();
    let first = &json[0];
    assert!(first.get("defectRate").is_some());
    assert!(first.get("probAccept").is_some());
    assert!(first.get("defect_rate").is_none());
}
