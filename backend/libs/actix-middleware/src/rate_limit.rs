use crate::limiter::{RateLimitDecision, RateLimitPolicy};
use crate::metrics::RATE_LIMIT_REJECTIONS_TOTAL;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REJECTION_MESSAGE: &str = "Too many requests. Please try again later.";

/// Client key used when the peer address is unavailable
const UNKNOWN_CLIENT: &str = "unknown";

/// Global admission gate applied before route dispatch
///
/// Every request consumes one unit of its client's allowance from the injected
/// [`RateLimitPolicy`]. Rejected requests are answered immediately with
/// `429 Too Many Requests`, a `Retry-After` header and `{"error": message}`;
/// nothing is queued.
///
/// The client key is the peer IP. With `trust_proxy_headers(true)` the
/// `Forwarded`/`X-Forwarded-For` value is used instead; only enable that
/// behind a proxy that overwrites those headers.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    policy: Arc<dyn RateLimitPolicy>,
    message: Arc<str>,
    trust_proxy_headers: bool,
}

impl RateLimitMiddleware {
    pub fn new(policy: Arc<dyn RateLimitPolicy>) -> Self {
        Self {
            policy,
            message: Arc::from(DEFAULT_REJECTION_MESSAGE),
            trust_proxy_headers: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Arc::from(message.into());
        self
    }

    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            policy: self.policy.clone(),
            message: self.message.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    policy: Arc<dyn RateLimitPolicy>,
    message: Arc<str>,
    trust_proxy_headers: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_key(&req, self.trust_proxy_headers);

        match self.policy.check(&key) {
            RateLimitDecision::Allowed => {
                let service = self.service.clone();
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            RateLimitDecision::Rejected { retry_after } => {
                tracing::warn!(
                    client = %key,
                    policy = self.policy.name(),
                    path = %req.path(),
                    retry_after_secs = retry_after_secs(retry_after),
                    "Rate limit exceeded"
                );
                RATE_LIMIT_REJECTIONS_TOTAL
                    .with_label_values(&[self.policy.name()])
                    .inc();

                let response = HttpResponse::TooManyRequests()
                    .insert_header((header::RETRY_AFTER, retry_after_secs(retry_after).to_string()))
                    .json(serde_json::json!({ "error": &*self.message }));

                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}

fn client_key(req: &ServiceRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        // Falls back to the peer socket address (with port) when no proxy header is present
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr
                .parse::<SocketAddr>()
                .map(|socket| socket.ip().to_string())
                .unwrap_or_else(|_| addr.to_string());
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Whole seconds for `Retry-After`, rounded up and never zero
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}
