//! HTTP request logging middleware
//!
//! Writes one line per request with the method, path, status, matched route and
//! duration, whether the inner service succeeded or failed. Handler panics are
//! turned into 500 responses by `CatchPanicLayer` beneath this layer.

use std::{
    fmt::{self, Display},
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use axum::extract::MatchedPath;
use http::{Method, Request, Response, StatusCode};
use tower::Layer;

type Observer = Arc<dyn Fn(&RequestRecord) + Send + Sync>;

/// Outcome of a single request, as written to the log.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    /// Route template the router matched, if any.
    pub route: Option<String>,
    pub duration: Duration,
}

impl Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[REQ] {} {} -> {} route={} {:.1}ms",
            self.method,
            self.path,
            self.status.as_u16(),
            self.route.as_deref().unwrap_or("-"),
            self.duration.as_secs_f64() * 1000.0,
        )
    }
}

/// Layer for request logging
#[derive(Clone)]
pub struct RequestLogLayer {
    observer: Option<Observer>,
}

impl RequestLogLayer {
    pub fn new() -> Self {
        Self { observer: None }
    }

    /// Also hand every record to `observer`, after it has been logged.
    pub fn with_observer(observer: impl Fn(&RequestRecord) + Send + Sync + 'static) -> Self {
        Self {
            observer: Some(Arc::new(observer)),
        }
    }
}

impl Default for RequestLogLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<Service> Layer<Service> for RequestLogLayer
where
    Service: Send + Clone,
{
    type Service = RequestLogService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        RequestLogService {
            next,
            observer: self.observer.clone(),
        }
    }
}

/// Service that logs every request passing through it
#[derive(Clone)]
pub struct RequestLogService<Service> {
    next: Service,
    observer: Option<Observer>,
}

impl<Service, ReqBody, ResBody> tower::Service<Request<ReqBody>> for RequestLogService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<ResBody>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let start = Instant::now();

        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str().to_owned());

        let mut next = self.next.clone();
        let observer = self.observer.clone();

        Box::pin(async move {
            let result = next.call(req).await;

            let status = match &result {
                Ok(response) => response.status(),
                Err(error) => {
                    log::error!("Unhandled error while serving {method} {path}: {error}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };

            let record = RequestRecord {
                method,
                path,
                status,
                route,
                duration: start.elapsed(),
            };

            log::info!("{record}");

            if let Some(observer) = observer {
                observer(&record);
            }

            result
        })
    }
}
