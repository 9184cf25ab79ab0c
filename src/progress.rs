//! 进度通知 - 尽力而为的发布/订阅
//!
//! 向外部观察者推送 log / progress / step 三类消息。
//! 发布是非阻塞的：没有任何订阅者时发送直接被忽略，不算错误。

use serde::Serialize;
use tokio::sync::broadcast;

/// 日志级别（对应调试页的展示样式）
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// 进度事件
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// 一条日志
    Log { message: String, level: LogLevel },
    /// 批次进度（第 current 个 / 共 total 个）
    Progress { current: usize, total: usize },
    /// 当前步骤描述
    Step { step: String },
}

/// 进度发布器
///
/// 职责：
/// - 持有 broadcast 发送端
/// - 暴露 publish / subscribe 能力
/// - 不关心订阅者是谁、有没有
#[derive(Clone, Debug)]
pub struct ProgressPublisher {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressPublisher {
    /// 创建新的进度发布器
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 订阅进度事件
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// 发布一个事件（无订阅者时静默忽略）
    pub fn publish(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }

    /// 发布一条普通日志
    pub fn log(&self, message: impl Into<String>) {
        self.publish(ProgressEvent::Log {
            message: message.into(),
            level: LogLevel::Info,
        });
    }

    /// 发布一条成功日志
    pub fn log_success(&self, message: impl Into<String>) {
        self.publish(ProgressEvent::Log {
            message: message.into(),
            level: LogLevel::Success,
        });
    }

    /// 发布一条错误日志
    pub fn log_error(&self, message: impl Into<String>) {
        self.publish(ProgressEvent::Log {
            message: message.into(),
            level: LogLevel::Error,
        });
    }

    /// 发布批次进度
    pub fn progress(&self, current: usize, total: usize) {
        self.publish(ProgressEvent::Progress { current, total });
    }

    /// 发布当前步骤
    pub fn step(&self, step: impl Into<String>) {
        self.publish(ProgressEvent::Step { step: step.into() });
    }
}

impl Default for ProgressPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscriber_is_silent() {
        let publisher = ProgressPublisher::default();

        // 没有订阅者时发布不应 panic，也不应返回错误
        publisher.log("没有人在听");
        publisher.progress(1, 3);
        publisher.step("打开页面");
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let publisher = ProgressPublisher::default();
        let mut rx = publisher.subscribe();

        publisher.progress(1, 2);
        publisher.step("截图".to_string());
        publisher.log_success("完成");

        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Progress { current: 1, total: 2 }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Step {
                step: "截图".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Log {
                message: "完成".to_string(),
                level: LogLevel::Success,
            }
        );
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(ProgressEvent::Progress { current: 2, total: 5 }).unwrap();
        assert_eq!(json["kind"], "progress");
        assert_eq!(json["current"], 2);
        assert_eq!(json["total"], 5);

        let json = serde_json::to_value(ProgressEvent::Log {
            message: "hello".to_string(),
            level: LogLevel::Error,
        })
        .unwrap();
        assert_eq!(json["kind"], "log");
        assert_eq!(json["level"], "error");
    }
}
