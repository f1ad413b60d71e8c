// ==========================================
// 验收抽样决策系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 质量控制决策支持 (抽样判定 + OC 曲线)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 抽样判定与 OC 曲线纯计算
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配与共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Decision, PlanType, Stage1Outcome};

// 领域实体
pub use domain::{InspectionOutcome, PlanKey, SamplingPlan, SamplingRecord};

// 引擎
pub use engine::{
    BinomialKernel, CurveAggregator, DoubleSamplingEngine, EngineError, EngineResult,
    MergedCurvePoint, OcCurve, OcCurvePoint, OcSweep, SingleSamplingEngine,
};

// 仓储
pub use repository::{RepositoryError, RepositoryResult, SamplingRecordRepository};

// API
pub use api::{ApiError, ApiResult, ComparisonReport, ReportApi, SamplingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "验收抽样决策系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
