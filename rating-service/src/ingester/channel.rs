use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use common::Error;

use super::MessageReader;

/// 进程内消息读取器，用于本地运行和测试
#[derive(Debug)]
pub struct ChannelReader {
    rx: Mutex<mpsc::Receiver<Vec<u8>>>,
}

/// 创建进程内消息通道，所有发送端释放后读取器返回消息流结束
pub fn channel_broker(capacity: usize) -> (mpsc::Sender<Vec<u8>>, ChannelReader) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelReader { rx: Mutex::new(rx) })
}

#[async_trait]
impl MessageReader for ChannelReader {
    async fn read_message(&self) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.rx.lock().await.recv().await)
    }
}
