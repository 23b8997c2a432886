//! Scripted `Transport` for unit tests.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use super::client::{ApiRequest, Transport};
use super::error::{RequestError, RequestResult};

type Responder = dyn Fn(usize, &ApiRequest) -> RequestResult + Send + Sync;
type Latency = dyn Fn(&ApiRequest) -> Duration + Send + Sync;

/// Records every request and answers from a closure keyed by call index.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<ApiRequest>>,
    latency: Option<Box<Latency>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &ApiRequest) -> RequestResult + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Answer every call with the same result.
    pub fn always(result: RequestResult) -> Self {
        Self::new(move |_, _| result.clone())
    }

    /// Answer calls in order; once exhausted every call is a `Runtime` fault.
    pub fn sequence(results: Vec<RequestResult>) -> Self {
        Self::new(move |i, _| results.get(i).cloned().unwrap_or(Err(RequestError::Runtime)))
    }

    /// Hold each response for `delay` before returning it.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_latency(move |_| delay)
    }

    /// Hold each response for a per-request duration.
    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(&ApiRequest) -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Box::new(latency));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = RequestResult> + Send {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        let result = (self.responder)(index, &request);
        let delay = self.latency.as_ref().map(|latency| latency(&request));
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

/// A well-formed token refresh/obtain response.
pub fn token_response(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh })
}
