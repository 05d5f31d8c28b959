use std::sync::Mutex;

use async_trait::async_trait;
use kt_http::ExchangeGateway;
use kt_http::Result;
use serde_json::Value;

type Responder = Box<dyn Fn(&str, &[(&str, String)]) -> Result<Value> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub method: String,
    pub params: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }
}

/// Gateway answering every call through a closure, recording each call
pub(crate) struct MockGateway {
    responder: Responder,
    calls: Mutex<Vec<Call>>,
}

impl MockGateway {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[(&str, String)]) -> Result<Value> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| call.method == method).count()
    }

    fn answer(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let call = Call { method: method.to_string(), params: params.iter().map(|(key, value)| (key.to_string(), value.clone())).collect() };
        self.calls.lock().unwrap().push(call);
        (self.responder)(method, params)
    }
}

#[async_trait]
impl ExchangeGateway for MockGateway {
    async fn query_public(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        self.answer(method, params)
    }

    async fn query_private(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        self.answer(method, params)
    }
}
