/// Real-time notifications over WebSocket
///
/// - `GET /ws/` upgrades to a [`NotificationSession`]
/// - sessions register with a single [`NotificationHub`] actor
/// - handlers publish through [`Notifier`]; every open session receives the
///   frame as JSON text
pub mod hub;
pub mod messages;
pub mod session;

pub use hub::NotificationHub;
pub use messages::Notification;
pub use session::NotificationSession;

use crate::config::NotificationsConfig;
use actix::{Actor, Addr};
use messages::Publish;

/// Cloneable handle to the hub, kept in application state
#[derive(Clone)]
pub struct Notifier {
    hub: Addr<NotificationHub>,
    config: NotificationsConfig,
}

impl Notifier {
    /// Start the hub on the current arbiter
    pub fn start(config: NotificationsConfig) -> Self {
        Self {
            hub: NotificationHub::default().start(),
            config,
        }
    }

    /// Queue `notification` for every open session; never waits on delivery
    pub fn publish(&self, notification: Notification) {
        self.hub.do_send(Publish(notification));
    }

    pub fn session(&self) -> NotificationSession {
        NotificationSession::new(self.hub.clone(), self.config)
    }

    pub fn hub(&self) -> &Addr<NotificationHub> {
        &self.hub
    }
}
