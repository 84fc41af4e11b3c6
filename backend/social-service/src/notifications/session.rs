use super::hub::NotificationHub;
use super::messages::{echo_reply, Connect, Disconnect, Push};
use crate::config::NotificationsConfig;
use actix::fut;
use actix::prelude::*;
use actix_web_actors::ws;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One WebSocket client
///
/// Text frames are echoed back, pings answered, and hub pushes forwarded as
/// text. A client that stays silent past the timeout is dropped.
pub struct NotificationSession {
    id: usize,
    hb: Instant,
    hub: Addr<NotificationHub>,
    config: NotificationsConfig,
}

impl NotificationSession {
    pub fn new(hub: Addr<NotificationHub>, config: NotificationsConfig) -> Self {
        Self {
            id: 0,
            hb: Instant::now(),
            hub,
            config,
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.config.client_timeout();
        ctx.run_interval(self.config.heartbeat_interval(), move |act, ctx| {
            if Instant::now().duration_since(act.hb) > timeout {
                warn!(session_id = act.id, "Notification session heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for NotificationSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        // Inbound frames wait until the hub has assigned an id
        self.hub
            .send(Connect {
                session: ctx.address().recipient(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(id) => {
                        act.id = id;
                        info!(session_id = id, "Notification session opened");
                    }
                    Err(e) => {
                        warn!(error = %e, "Notification hub unavailable");
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.hub.do_send(Disconnect { id: self.id });
        info!(session_id = self.id, "Notification session closed");
        Running::Stop
    }
}

impl Handler<Push> for NotificationSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NotificationSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => {
                self.hb = Instant::now();
                ctx.pong(&bytes);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                debug!(session_id = self.id, len = text.len(), "Notification session text frame");
                ctx.text(echo_reply(&text));
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Binary(_)) | Ok(ws::Message::Continuation(_)) => {
                ctx.close(Some(ws::CloseCode::Unsupported.into()));
                ctx.stop();
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!(session_id = self.id, error = %e, "Notification session protocol error");
                ctx.stop();
            }
        }
    }
}
