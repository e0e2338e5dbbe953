// Notification Channel
// 外部数据处理结果的发布/订阅，每个输入至多发布一个事件

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    domain::{Coin, MenuRequest, NavigationIntent},
    error::ErrorBody,
};

// ============ 事件类型定义 ============

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum IncomingDataEvent {
    /// 导航到目标页面
    IncomingDataRedir(NavigationIntent),
    /// 展示消歧菜单
    IncomingDataMenu(MenuRequest),
    /// 处理失败
    IncomingDataError(ErrorBody),
    /// 菜单关闭
    #[serde(rename_all = "camelCase")]
    FinishIncomingDataMenu {
        redir_to: Option<String>,
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        coin: Option<Coin>,
    },
}

impl IncomingDataEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::IncomingDataRedir(_) => "IncomingDataRedir",
            Self::IncomingDataMenu(_) => "IncomingDataMenu",
            Self::IncomingDataError(_) => "IncomingDataError",
            Self::FinishIncomingDataMenu { .. } => "FinishIncomingDataMenu",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event: IncomingDataEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventEnvelope {
    pub fn new(event: IncomingDataEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event,
            published_at: chrono::Utc::now(),
        }
    }
}

// ============ Notification Channel 接口 ============

/// 事件发布通道；发布即忘，不等待订阅方
pub trait NotificationChannel: Send + Sync {
    fn publish(&self, event: IncomingDataEvent);
}

// ============ 广播实现 ============

#[derive(Clone)]
pub struct BroadcastNotificationChannel {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastNotificationChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotificationChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationChannel for BroadcastNotificationChannel {
    fn publish(&self, event: IncomingDataEvent) {
        let event_type = event.event_type();
        let envelope = EventEnvelope::new(event);
        // 没有订阅者时 send 返回错误，事件直接丢弃
        if self.sender.send(envelope).is_err() {
            tracing::debug!(event_type, "No subscribers for incoming data event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Destination, MenuKind};

    #[tokio::test]
    async fn test_publish_subscribe() {
        let channel = BroadcastNotificationChannel::default();
        let mut rx = channel.subscribe();

        channel.publish(IncomingDataEvent::IncomingDataRedir(
            NavigationIntent::new(Destination::AmountPage).with("toAddress", "addr"),
        ));

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event.event_type(), "IncomingDataRedir");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let channel = BroadcastNotificationChannel::new(1);
        channel.publish(IncomingDataEvent::IncomingDataMenu(MenuRequest::new(
            "hello",
            MenuKind::Text,
        )));
    }

    #[test]
    fn test_event_serialization() {
        let event = IncomingDataEvent::FinishIncomingDataMenu {
            redir_to: Some("AmountPage".into()),
            value: Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".into()),
            coin: Some(Coin::Btc),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "FinishIncomingDataMenu");
        assert_eq!(json["data"]["redirTo"], "AmountPage");
        assert_eq!(json["data"]["coin"], "btc");

        let redir = IncomingDataEvent::IncomingDataRedir(
            NavigationIntent::new(Destination::ConfirmPage).with("amount", "100000"),
        );
        let json = serde_json::to_value(&redir).unwrap();
        assert_eq!(json["data"]["name"], "ConfirmPage");
        assert_eq!(json["data"]["params"]["amount"], "100000");
    }
}
