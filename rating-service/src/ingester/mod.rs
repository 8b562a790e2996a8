//! 评分消息摄取
//!
//! `MessageReader` 是对消息中间件的最小抽象，`Ingester` 把读取到的原始消息
//! 解码为 `RatingEvent` 并送入有界通道，由控制器逐条消费。

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use common::models::RatingEvent;
use common::Error;

mod channel;
mod kafka;

pub use channel::{channel_broker, ChannelReader};
pub use kafka::KafkaReader;

/// 摄取通道容量，消费者处理完一条后才继续读取下一条
pub const INGEST_CHANNEL_CAPACITY: usize = 1;

/// 消息读取接口
#[async_trait]
pub trait MessageReader: Send + Sync + Debug + 'static {
    /// 读取下一条消息
    ///
    /// 返回 `Ok(None)` 表示消息流已结束
    async fn read_message(&self) -> Result<Option<Vec<u8>>, Error>;
}

/// 评分事件来源
#[async_trait]
pub trait RatingIngester: Send + Sync + Debug {
    /// 开始摄取，返回评分事件的接收端
    ///
    /// 取消令牌触发或消息流结束后，后台任务退出并关闭通道
    async fn ingest(&self, cancel: CancellationToken) -> Result<mpsc::Receiver<RatingEvent>, Error>;
}

/// 基于 `MessageReader` 的评分摄取器
#[derive(Debug)]
pub struct Ingester<R: MessageReader> {
    reader: Arc<R>,
}

impl<R: MessageReader> Ingester<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Arc::new(reader),
        }
    }
}

#[async_trait]
impl<R: MessageReader> RatingIngester for Ingester<R> {
    async fn ingest(&self, cancel: CancellationToken) -> Result<mpsc::Receiver<RatingEvent>, Error> {
        let (tx, rx) = mpsc::channel(INGEST_CHANNEL_CAPACITY);
        let reader = self.reader.clone();
        tokio::spawn(read_loop(reader, tx, cancel));
        Ok(rx)
    }
}

async fn read_loop<R: MessageReader>(
    reader: Arc<R>,
    tx: mpsc::Sender<RatingEvent>,
    cancel: CancellationToken,
) {
    info!("评分摄取任务已启动");
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = reader.read_message() => message,
        };

        let payload = match message {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("消息流已结束");
                break;
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    break;
                }
                error!("读取评分消息失败: {}", e);
                continue;
            }
        };

        let event: RatingEvent = match serde_json::from_slice(&payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("评分消息解码失败，已跳过: {}", e);
                continue;
            }
        };
        debug!(record_id = %event.record_id, record_type = %event.record_type, "收到评分事件");

        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = tx.send(event) => {
                if sent.is_err() {
                    // 接收端已释放
                    break;
                }
            }
        }
    }
    info!("评分摄取任务已停止");
}
