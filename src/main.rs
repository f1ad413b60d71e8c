// ==========================================
// 验收抽样决策系统 - 演示入口
// ==========================================
// 用途: 跑一遍完整的评估 + 报告流程
//   1. 单次方案评估并落库
//   2. 二次方案第一阶段 → 第二阶段评估并落库
//   3. 构建单次 vs 二次的 OC 曲线对比报告
// ==========================================

use acceptance_sampling::api::dto::{
    EvaluateDoubleStage1Request, EvaluateDoubleStage2Request, EvaluateSingleRequest,
};
use acceptance_sampling::app::{get_default_db_path, AppState};
use acceptance_sampling::{i18n, logging};
use serde_json::Value;

fn num(v: u64) -> Option<Value> {
    Some(Value::from(v))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", acceptance_sampling::APP_NAME);
    tracing::info!("系统版本: {}", acceptance_sampling::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    // 输出当前配置口径, 便于排查曲线步长/容差问题
    match state.config_manager.get_config_snapshot() {
        Ok(snapshot) => tracing::info!("配置快照: {}", snapshot),
        Err(e) => tracing::warn!("读取配置快照失败: {}", e),
    }

    // ==========================================
    // 单次抽样评估: N=500, n=50, c=2, d=3
    // ==========================================
    let response = state.sampling_api.evaluate_single(EvaluateSingleRequest {
        lot_size: num(500),
        sample_size: num(50),
        acceptance_number: num(2),
        defects_observed: num(3),
    })?;
    println!(
        "单次方案 (n=50, c=2, d=3): {} ({})",
        response.decision,
        i18n::t(&format!("decision.{}", response.decision.to_lowercase()))
    );

    // ==========================================
    // 二次抽样评估: n1=50, c1=2, r1=5 / n2=50, c2=6
    // ==========================================
    let stage1 = state
        .sampling_api
        .evaluate_double_stage1(EvaluateDoubleStage1Request {
            lot_size: num(500),
            n1: num(50),
            c1: num(2),
            r1: num(5),
            d1: num(3),
        })?;
    println!(
        "二次方案第一阶段 (d1=3): {} ({})",
        stage1.decision,
        i18n::t(&format!("decision.{}", stage1.decision.to_lowercase()))
    );

    if stage1.decision == "Continue" {
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
            })?;
        println!(
            "二次方案第二阶段 (d2=2, 累计 5): {} ({})",
            stage2.decision,
            i18n::t(&format!("decision.{}", stage2.decision.to_lowercase()))
        );
    }

    // ==========================================
    // OC 曲线对比报告
    // ==========================================
    let report = state.report_api.build_comparison().await?;
    println!(
        "对比报告: 单次方案 {} 个 / 二次方案 {} 个, 合并对比表 {} 行",
        report.single_plan_count,
        report.double_plan_count,
        report.merged.len()
    );
    if let Some(point) = report.single_series.iter().find(|p| p.defect_rate > 0.049) {
        println!(
            "单次平均曲线 @ p={:.2}: 接收概率 {:.4}",
            point.defect_rate, point.prob_accept
        );
    }

    Ok(())
}
