use super::messages::{Connect, Disconnect, Publish, Push, SessionCount};
use actix::prelude::*;
use prometheus::{register_int_gauge, IntGauge};
use std::collections::HashMap;
use tracing::{debug, warn};

lazy_static::lazy_static! {
    static ref NOTIFICATION_SESSIONS: IntGauge = register_int_gauge!(
        "notification_sessions_active",
        "Open WebSocket notification sessions"
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Registry of open notification sessions
///
/// Runs as a single actor, so registration, removal and fan-out are
/// serialized through its mailbox.
#[derive(Default)]
pub struct NotificationHub {
    sessions: HashMap<usize, Recipient<Push>>,
    next_id: usize,
}

impl NotificationHub {
    fn refresh_gauge(&self) {
        NOTIFICATION_SESSIONS.set(self.sessions.len() as i64);
    }
}

impl Actor for NotificationHub {
    type Context = Context<Self>;
}

impl Handler<Connect> for NotificationHub {
    type Result = usize;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> usize {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.sessions.insert(id, msg.session);
        self.refresh_gauge();

        debug!(session_id = id, sessions = self.sessions.len(), "Notification session registered");
        id
    }
}

impl Handler<Disconnect> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        if self.sessions.remove(&msg.id).is_some() {
            self.refresh_gauge();
            debug!(session_id = msg.id, "Notification session removed");
        }
    }
}

impl Handler<Publish> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Publish, _: &mut Context<Self>) {
        let frame = match msg.0.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to encode notification");
                return;
            }
        };

        for session in self.sessions.values() {
            session.do_send(Push(frame.clone()));
        }
    }
}

impl Handler<SessionCount> for NotificationHub {
    type Result = usize;

    fn handle(&mut self, _: SessionCount, _: &mut Context<Self>) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::messages::Notification;
    use std::sync::{Arc, Mutex};

    /// Stand-in session that records what it is sent
    struct Collector(Arc<Mutex<Vec<String>>>);

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<Push> for Collector {
        type Result = ();

        fn handle(&mut self, msg: Push, _: &mut Context<Self>) {
            self.0.lock().unwrap().push(msg.0);
        }
    }

    async fn wait_for_len(frames: &Arc<Mutex<Vec<String>>>, len: usize) {
        for _ in 0..100 {
            if frames.lock().unwrap().len() >= len {
                return;
            }
            actix_rt::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("expected {} frames, got {}", len, frames.lock().unwrap().len());
    }

    fn post(id: i64) -> Notification {
        Notification::PostCreated {
            post_id: id,
            user_id: 1,
            content: format!("post {}", id),
            created_at: chrono::Utc::now(),
        }
    }

    #[actix_rt::test]
    async fn test_publish_reaches_every_session_until_disconnect() {
        let hub = NotificationHub::default().start();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let first_id = hub
            .send(Connect {
                session: Collector(first.clone()).start().recipient(),
            })
            .await
            .unwrap();
        let second_id = hub
            .send(Connect {
                session: Collector(second.clone()).start().recipient(),
            })
            .await
            .unwrap();
        assert_ne!(first_id, second_id);
        assert_eq!(hub.send(SessionCount).await.unwrap(), 2);

        hub.do_send(Publish(post(1)));
        wait_for_len(&first, 1).await;
        wait_for_len(&second, 1).await;
        assert!(first.lock().unwrap()[0].contains("\"post_id\":1"));

        hub.do_send(Disconnect { id: first_id });
        hub.do_send(Publish(post(2)));
        wait_for_len(&second, 2).await;
        assert!(second.lock().unwrap()[1].contains("\"post_id\":2"));
        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(hub.send(SessionCount).await.unwrap(), 1);
    }

    #[actix_rt::test]
    async fn test_disconnect_of_unknown_id_is_ignored() {
        let hub = NotificationHub::default().start();
        hub.do_send(Disconnect { id: 42 });
        assert_eq!(hub.send(SessionCount).await.unwrap(), 0);
    }
}
