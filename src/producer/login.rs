//! E-commerce login traffic.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::{ProduceError, Producer};
use crate::meta::{json_header, MetaProvider};
use crate::random::FakeSource;
use crate::record::{Request, Response, TransactionRecord, Url};

pub const HOST: &str = "test-ecommerce.metlo.com";
pub const PATH: &str = "/login";
pub const PASSWORD_WORDS: usize = 5;

const AVG_EMIT_DELTA: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    user_uuid: String,
    api_key: String,
}

/// A successful `POST /login` against the test shop.
pub struct LoginProducer {
    fake: FakeSource,
    meta: Arc<dyn MetaProvider>,
}

impl LoginProducer {
    pub fn new(fake: FakeSource, meta: Arc<dyn MetaProvider>) -> Self {
        Self { fake, meta }
    }
}

impl Producer for LoginProducer {
    fn name(&self) -> &'static str {
        "ecommerce.login"
    }

    fn avg_emit_delta(&self) -> Duration {
        AVG_EMIT_DELTA
    }

    fn produce(&mut self, timestamp: DateTime<Utc>) -> Result<TransactionRecord, ProduceError> {
        let resp_body = LoginResponse {
            success: true,
            user_uuid: self.fake.uuid_v4().to_string(),
            api_key: self.fake.uuid_v4().to_string(),
        };
        let req_body = LoginRequest {
            email: self.fake.free_email(),
            password: self.fake.sentence(PASSWORD_WORDS),
        };

        Ok(TransactionRecord {
            request: Request {
                url: Url {
                    host: HOST.to_string(),
                    path: PATH.to_string(),
                    parameters: Vec::new(),
                },
                headers: Vec::new(),
                method: "POST".to_string(),
                body: serde_json::to_string(&req_body)?,
            },
            response: Response {
                status: 200,
                headers: vec![json_header()],
                body: serde_json::to_string(&resp_body)?,
            },
            meta: self.meta.meta(&mut self.fake, timestamp)?,
        })
    }
}
