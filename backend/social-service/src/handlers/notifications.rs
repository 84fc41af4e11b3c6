use crate::AppState;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

pub const GREETING: &str = "Hello, this is the notification server!";

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(GREETING)
}

/// Upgrade to a notification session; plain HTTP requests get 400
pub async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(state.notifications.session(), &req, stream)
}
