use anyhow::{anyhow, Result};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// 日志输出格式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    // 普通文本格式
    Plain,
    // JSON格式，适合ELK等日志聚合系统
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        }
    }
}

/// 初始化日志系统
///
/// 未加载配置时使用，默认全局级别为info
///
/// # 示例
/// ```no_run
/// fn main() -> anyhow::Result<()> {
///     common::logging::init()?;
///     tracing::info!("日志系统初始化成功");
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    init_with_custom_filter(&[("sqlx", "warn")])
}

/// 自定义多组件日志级别
pub fn init_with_custom_filter(directives: &[(&str, &str)]) -> Result<()> {
    let filter_string = build_filter_string("info", directives.iter().copied());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_string));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow!("日志系统初始化失败: {}", e))?;

    info!("日志系统初始化成功，使用自定义过滤器");
    Ok(())
}

/// 从配置初始化日志系统
///
/// 过滤器由全局级别、sqlx级别和各组件级别组成，
/// 环境变量 RUST_LOG 会整体覆盖配置，RUST_LOG_<组件> 覆盖单个组件
pub fn init_from_config(config: &crate::config::AppConfig) -> Result<()> {
    let log = &config.log;

    let mut directives = vec![("sqlx".to_string(), log.sqlx_level().to_string())];
    if let Some(components) = &log.components {
        for (component, level) in components {
            directives.push((component.clone(), level.clone()));
        }
    }
    let filter_string = build_filter_string(
        &log.level,
        directives.iter().map(|(c, l)| (c.as_str(), l.as_str())),
    );

    // 检查环境变量是否有覆盖设置
    let env_filter = if let Ok(env_filter) = env::var("RUST_LOG") {
        EnvFilter::new(env_filter)
    } else {
        EnvFilter::new(filter_string)
    };
    let env_filter = check_env_component_overrides(env_filter);

    let log_format = log
        .format
        .as_deref()
        .map(LogFormat::parse)
        .unwrap_or(LogFormat::Plain);

    let result = match log_format {
        LogFormat::Plain => fmt()
            .with_env_filter(env_filter)
            .with_ansi(true)
            .with_thread_names(true)
            .try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_thread_names(true)
            .try_init(),
    };
    result.map_err(|e| anyhow!("日志系统初始化失败: {}", e))?;

    info!("日志系统从配置初始化成功，全局级别: {}", log.level);
    info!("日志格式: {:?}", log_format);
    Ok(())
}

fn build_filter_string<'a>(
    level: &str,
    directives: impl Iterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut filter_parts = vec![level.to_string()];
    for (target, level) in directives {
        filter_parts.push(format!("{}={}", target, level));
    }
    filter_parts.join(",")
}

/// 检查环境变量中是否有组件特定的日志级别覆盖
fn check_env_component_overrides(mut env_filter: EnvFilter) -> EnvFilter {
    let common_components = ["sqlx", "tonic", "h2", "rdkafka", "redis"];

    for component in &common_components {
        let env_var_name = format!("RUST_LOG_{}", component.to_uppercase());
        if let Ok(level) = env::var(&env_var_name) {
            // 解析失败则忽略
            if let Ok(directive) = format!("{}={}", component, level).parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    env_filter
}
