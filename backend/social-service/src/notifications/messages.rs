/// Frames and actor messages for the notification channel
use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON frames pushed by the server to every connected session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A post was published
    PostCreated {
        post_id: i64,
        user_id: i64,
        content: String,
        created_at: DateTime<Utc>,
    },
}

impl Notification {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reply the server sends for each inbound text frame
pub fn echo_reply(text: &str) -> String {
    format!("Hello! You sent: {}", text)
}

/// Serialized frame delivered to one session
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Push(pub String);

/// Register a session; the hub answers with its id
#[derive(Message)]
#[rtype(result = "usize")]
pub struct Connect {
    pub session: Recipient<Push>,
}

#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: usize,
}

/// Fan a notification out to every registered session
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Publish(pub Notification);

/// Number of registered sessions
#[derive(Debug, Message)]
#[rtype(result = "usize")]
pub struct SessionCount;
