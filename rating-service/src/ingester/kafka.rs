use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message};
use std::fmt::{self, Debug, Formatter};
use tracing::info;

use common::config::AppConfig;
use common::Error;

use super::MessageReader;

/// Kafka消息读取器
///
/// 偏移量自动提交，消息至少投递一次
pub struct KafkaReader {
    consumer: StreamConsumer,
    topic: String,
}

impl Debug for KafkaReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaReader")
            .field("topic", &self.topic)
            .finish()
    }
}

impl KafkaReader {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("group.id", &config.kafka.group)
            .set("bootstrap.servers", config.kafka.brokers())
            .set("enable.partition.eof", "false")
            .set(
                "session.timeout.ms",
                config.kafka.consumer.session_timeout.to_string(),
            )
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", &config.kafka.consumer.auto_offset_reset)
            .create()
            .map_err(|e| Error::Kafka(format!("消费者创建失败: {}", e)))?;

        consumer
            .subscribe(&[&config.kafka.topic])
            .map_err(|e| Error::Kafka(format!("无法订阅指定的主题: {}", e)))?;

        info!("已订阅Kafka主题: {}", config.kafka.topic);
        Ok(Self {
            consumer,
            topic: config.kafka.topic.clone(),
        })
    }
}

#[async_trait]
impl MessageReader for KafkaReader {
    async fn read_message(&self) -> Result<Option<Vec<u8>>, Error> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| Error::Kafka(e.to_string()))?;
        // 空消息体交给解码阶段跳过
        Ok(Some(message.payload().map(<[u8]>::to_vec).unwrap_or_default()))
    }
}
