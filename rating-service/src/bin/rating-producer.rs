use anyhow::{Context, Result};
use clap::Parser;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::info;

use common::config::{AppConfig, DEFAULT_CONFIG_PATH};
use common::models::RatingEvent;

/// 将评分事件文件写入Kafka主题
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// JSON数组格式的评分事件文件
    #[arg(short, long, default_value = "rating-service/data/ratingsdata.json")]
    file: String,
}

fn read_rating_events(path: &str) -> Result<Vec<RatingEvent>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("无法读取文件 {}", path))?;
    let events = serde_json::from_str(&content).with_context(|| format!("无法解析文件 {}", path))?;
    Ok(events)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = AppConfig::from_file(Some(&args.config))?;
    common::logging::init_from_config(&config)?;

    info!("正在创建Kafka生产者");
    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", config.kafka.brokers())
        .set(
            "message.timeout.ms",
            config.kafka.producer.timeout.to_string(),
        )
        .set(
            "socket.timeout.ms",
            config.kafka.connect_timeout.to_string(),
        )
        .set("acks", config.kafka.producer.acks.clone())
        .set("retries", config.kafka.producer.max_retry.to_string())
        .set(
            "retry.backoff.ms",
            config.kafka.producer.retry_interval.to_string(),
        )
        .create()
        .context("生产者创建失败")?;

    info!("从文件 {} 读取评分事件", args.file);
    let events = read_rating_events(&args.file)?;

    let timeout = Duration::from_millis(config.kafka.producer.timeout);
    for event in &events {
        let payload = serde_json::to_string(event)?;
        producer
            .send(
                FutureRecord::to(&config.kafka.topic)
                    .key(event.record_id.as_str())
                    .payload(payload.as_str()),
                timeout,
            )
            .await
            .map_err(|(e, _)| anyhow::anyhow!("发送评分事件失败: {}", e))?;
    }

    producer.flush(timeout)?;
    info!("已向主题 {} 写入 {} 条评分事件", config.kafka.topic, events.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_is_valid() {
        let events = read_rating_events("data/ratingsdata.json").unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| (1..=5).contains(&e.value)));
    }
}
