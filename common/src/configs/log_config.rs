use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
    pub sqlx_level: Option<String>,    // SQL查询日志级别
    pub components: Option<std::collections::HashMap<String, String>>, // 其他组件的日志级别
    pub format: Option<String>,        // 日志输出格式: plain或json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sqlx_level: None,
            components: None,
            format: None,
        }
    }
}

impl LogConfig {
    // 获取sqlx日志级别
    pub fn sqlx_level(&self) -> &str {
        match &self.sqlx_level {
            Some(level) => level.as_str(),
            None => "info", // 默认值
        }
    }
}
