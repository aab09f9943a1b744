//! In-memory `PlatformApi` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use super::api::{ApiError, PlatformApi};
use super::envelope::Envelope;

#[derive(Clone)]
struct Reply {
    delay: Option<Duration>,
    result: Result<Value, ApiError>,
}

/// Canned replies keyed by path. Replies queued for a path are consumed in
/// order; the last one repeats.
#[derive(Default)]
pub(crate) struct MockApi {
    routes: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, path: &str, body: Value) -> Self {
        self.push(path, Reply { delay: None, result: Ok(body) })
    }

    pub(crate) fn reply_after(self, path: &str, delay: Duration, body: Value) -> Self {
        self.push(path, Reply { delay: Some(delay), result: Ok(body) })
    }

    pub(crate) fn fail(self, path: &str, err: ApiError) -> Self {
        self.push(path, Reply { delay: None, result: Err(err) })
    }

    fn push(self, path: &str, reply: Reply) -> Self {
        self.routes.lock().unwrap().entry(path.to_owned()).or_default().push(reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(p, _)| p == path).count()
    }
}

#[async_trait::async_trait]
impl PlatformApi for MockApi {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<Envelope, ApiError> {
        self.calls.lock().unwrap().push((path.to_owned(), token.map(str::to_owned)));
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(path) {
                Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
                Some(queue) => queue.first().cloned(),
                None => None,
            }
        };
        let Some(reply) = reply else {
            return Err(ApiError::NotFound { path: path.to_owned(), message: None });
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        let body = reply.result?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
