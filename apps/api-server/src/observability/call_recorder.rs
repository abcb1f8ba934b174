//! Call recorder middleware - persists one record per request/response.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::{self, BodySize, BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{Method, StatusCode},
    web::{self, Bytes, BytesMut},
};
use futures::StreamExt;
use futures::future::LocalBoxFuture;
use surcharge_core::domain::CallLog;
use surcharge_core::services::CallLogService;

use super::log_gate::{LogPermit, ThrottledLogGate};

/// Request description captured before the inner chain runs, kept in the
/// request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub endpoint: String,
    pub parameters: String,
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn placeholder(len: u64) -> String {
    format!("<body too large to log: {len} bytes>")
}

/// `{k=[v1, v2], k2=[v]}`, keys in order of first appearance.
fn describe_query(query: &str) -> String {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query)
        .map(web::Query::into_inner)
        .unwrap_or_default();

    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => grouped.push((key, vec![value])),
        }
    }

    let entries: Vec<String> = grouped
        .into_iter()
        .map(|(key, values)| format!("{key}=[{}]", values.join(", ")))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Records every call through [`CallLogService`] without delaying the
/// response.
///
/// 429 responses go through the shared [`ThrottledLogGate`] so a flood of
/// rejections produces one record per window.
#[derive(Clone)]
pub struct CallRecorder {
    call_logs: Arc<CallLogService>,
    gate: ThrottledLogGate,
    max_body_bytes: usize,
}

impl CallRecorder {
    pub fn new(call_logs: Arc<CallLogService>, gate: ThrottledLogGate, max_body_bytes: usize) -> Self {
        Self {
            call_logs,
            gate,
            max_body_bytes,
        }
    }

    fn body_text(&self, bytes: &[u8]) -> String {
        if bytes.len() > self.max_body_bytes {
            placeholder(bytes.len() as u64)
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    fn classify(&self, context: CallContext, status: StatusCode, body: String) {
        if status == StatusCode::TOO_MANY_REQUESTS {
            match self.gate.try_acquire() {
                Some(permit) => {
                    let log = CallLog::failure(context.endpoint, context.parameters, body, status.as_u16());
                    self.persist(log, Some(permit));
                }
                None => tracing::debug!(endpoint = %context.endpoint, "Suppressed 429 record"),
            }
            return;
        }

        let log = if status.is_client_error() || status.is_server_error() {
            CallLog::failure(context.endpoint, context.parameters, body, status.as_u16())
        } else {
            CallLog::success(context.endpoint, context.parameters, body, status.as_u16())
        };
        self.persist(log, None);
    }

    /// Persist in the background; the permit, if any, is released once the
    /// write finished.
    fn persist(&self, log: CallLog, permit: Option<LogPermit>) {
        let call_logs = Arc::clone(&self.call_logs);
        actix_web::rt::spawn(async move {
            call_logs.record(log).await;
            drop(permit);
        });
    }
}

impl<S, B> Transform<S, ServiceRequest> for CallRecorder
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = CallRecorderService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CallRecorderService {
            service: Rc::new(service),
            recorder: self.clone(),
        }))
    }
}

pub struct CallRecorderService<S> {
    service: Rc<S>,
    recorder: CallRecorder,
}

impl<S, B> Service<ServiceRequest> for CallRecorderService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let recorder = self.recorder.clone();

        Box::pin(async move {
            let request_body = if carries_body(req.method()) {
                let bytes = buffer_request_body(&mut req).await?;
                recorder.body_text(&bytes)
            } else {
                String::new()
            };

            let context = CallContext {
                endpoint: req.path().to_string(),
                parameters: format!(
                    "queryParams={}, pathParams={}, body={}",
                    describe_query(req.query_string()),
                    req.path(),
                    request_body
                ),
            };
            req.extensions_mut().insert(context.clone());

            let res = match service.call(req).await {
                Ok(res) => res,
                Err(err) => {
                    let status = err.as_response_error().status_code();
                    tracing::warn!(endpoint = %context.endpoint, %status, error = %err, "Request failed before producing a response");
                    let log = CallLog::failure(
                        context.endpoint,
                        context.parameters,
                        err.to_string(),
                        status.as_u16(),
                    );
                    recorder.persist(log, None);
                    return Err(err);
                }
            };

            let context = res
                .request()
                .extensions()
                .get::<CallContext>()
                .cloned()
                .unwrap_or(context);
            let status = res.status();

            let (http_req, http_res) = res.into_parts();
            let (head, body) = http_res.into_parts();

            let (captured, body) = match body.size() {
                BodySize::Sized(len) if len > recorder.max_body_bytes as u64 => {
                    (placeholder(len), BoxBody::new(body))
                }
                _ => {
                    let bytes = match body::to_bytes(body).await {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            let e: Box<dyn std::error::Error> = e.into();
                            let message = e.to_string();
                            tracing::warn!(endpoint = %context.endpoint, error = %message, "Response body failed mid-stream");
                            let log = CallLog::failure(
                                context.endpoint,
                                context.parameters,
                                message.clone(),
                                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                            );
                            recorder.persist(log, None);
                            return Err(actix_web::error::ErrorInternalServerError(message));
                        }
                    };
                    (recorder.body_text(&bytes), BoxBody::new(bytes))
                }
            };

            recorder.classify(context, status, captured);

            let response: HttpResponse<BoxBody> = head.set_body(body);
            Ok(ServiceResponse::new(http_req, response))
        })
    }
}

/// Drain the request payload and put the same bytes back for the handler.
async fn buffer_request_body(req: &mut ServiceRequest) -> Result<Bytes, Error> {
    let mut payload = req.take_payload();
    let mut buf = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        buf.extend_from_slice(&chunk?);
    }
    let bytes = buf.freeze();

    let (_, mut replay) = actix_http::h1::Payload::create(true);
    replay.unread_data(bytes.clone());
    req.set_payload(replay.into());

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_grouped_by_key() {
        assert_eq!(
            describe_query("number1=12&number2=50"),
            "{number1=[12], number2=[50]}"
        );
        assert_eq!(describe_query("a=1&b=2&a=3"), "{a=[1, 3], b=[2]}");
        assert_eq!(describe_query(""), "{}");
    }

    #[test]
    fn only_body_methods_are_buffered() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
    }
}
