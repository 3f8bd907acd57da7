//! The decision engine.
//!
//! A request enters at [`Node::B13`] and moves through the HTTP decision
//! diagram until some node answers with a status code:
//!
//! ```text
//!   B13 available? ─► B12 known method? ─► … ─► B3 OPTIONS?
//!        │                                          │
//!        ▼                                          ▼
//!   C3..F7 negotiate type, language, charset, encoding
//!        │
//!        ▼
//!   G7 exists? ─┬─► G8..L17 conditional headers ─► M16..P11 method handling
//!               └─► H7..N5 missing-resource branches
//! ```
//!
//! [`Engine::run`] never fails: malformed input becomes 400, resource
//! failures and engine bugs become 500, and every response leaves with
//! `Content-Length` and `Date`.
//!
//! # Example
//!
//! ```
//! use webmachine::decision::Engine;
//! use webmachine::http::request::{Method, RequestBuilder};
//! use webmachine::http::response::Response;
//! use webmachine::resource::Resource;
//!
//! struct Hello;
//! impl Resource for Hello {}
//!
//! let request = RequestBuilder::new()
//!     .method(Method::GET)
//!     .uri("http://localhost/hello")
//!     .build()
//!     .unwrap();
//! let response = Engine::default().run(&mut Hello, request, Response::new());
//! assert_eq!(response.status_u16(), Some(200));
//! ```

mod error;
mod flow;
mod fsm;
mod helpers;
mod metadata;
mod node;

pub use error::{FlowError, Outcome};
pub use metadata::Metadata;
pub use node::{Decision, Node};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::errors::{ErrorRenderer, HtmlErrorRenderer};
use crate::http::date;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::resource::{Context, Resource};

use fsm::{Fsm, Limits, panic_message};

/// Drives requests through the decision graph.
///
/// Holds only configuration and the error renderer, so one engine can serve
/// any number of concurrent traversals.
#[derive(Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    renderer: Arc<dyn ErrorRenderer>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let renderer = Arc::new(HtmlErrorRenderer::new(config.server_name.clone()));
        Self {
            config: Arc::new(config),
            renderer,
        }
    }

    /// Replaces the renderer used for 400, 404 and 500 bodies.
    pub fn with_renderer(mut self, renderer: Arc<dyn ErrorRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one traversal and returns the finished response.
    pub fn run(&self, resource: &mut dyn Resource, request: Request, response: Response) -> Response {
        self.run_with_cancel(resource, request, response, None)
    }

    /// Like [`run`](Engine::run), but stops with 503 at the next decision
    /// once `cancel` reads `true`.
    pub fn run_with_cancel(
        &self,
        resource: &mut dyn Resource,
        request: Request,
        response: Response,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Response {
        let started = Instant::now();
        let limits = Limits {
            max_decisions: self.config.max_decisions,
            deadline: self.config.traversal_timeout().map(|t| started + t),
            cancel,
        };

        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Traversal started"
        );

        let mut fsm = Fsm::new(
            resource,
            Context::new(request, response),
            self.renderer.as_ref(),
            limits,
        );

        let failure = match panic::catch_unwind(AssertUnwindSafe(|| fsm.drive())) {
            Ok(Ok(decisions)) => {
                info!(
                    method = %fsm.ctx.request().method(),
                    path = %fsm.ctx.request().uri().path(),
                    status = fsm.ctx.response().status_u16().unwrap_or_default(),
                    decisions,
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "Request handled"
                );
                None
            }
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(format!("panic during traversal: {}", panic_message(payload.as_ref()))),
        };

        if let Some(message) = failure {
            error!(
                method = %fsm.ctx.request().method(),
                path = %fsm.ctx.request().uri().path(),
                error = %message,
                "Traversal failed, answering 500"
            );
            fsm.fail_safe();
        }

        fsm.into_response()
    }

    /// Runs the traversal on tokio's blocking pool so synchronous resource
    /// callbacks do not stall the runtime.
    pub async fn run_async(
        &self,
        resource: Box<dyn Resource + Send>,
        request: Request,
        response: Response,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Response {
        let engine = self.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let mut resource = resource;
            engine.run_with_cancel(resource.as_mut(), request, response, cancel)
        });

        match handle.await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Traversal task failed");
                let mut response = Response::new();
                response.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
                response.set_header("Content-Length", "0");
                response.set_header("Date", date::format(&chrono::Utc::now()));
                response
            }
        }
    }
}

/// Runs one traversal with a default engine.
pub fn run(resource: &mut dyn Resource, request: Request, response: Response) -> Response {
    Engine::default().run(resource, request, response)
}
