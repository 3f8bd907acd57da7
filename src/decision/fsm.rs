//! The traversal loop and the response finalizer.
//!
//! ```text
//!   B13 ──► node ──► node ──► … ──► status
//!              │                      │
//!              └─ failure ─► 400/500 ─┤
//!                                     ▼
//!                 respond: status, headers, 404/304 extras,
//!                 finish_request, Content-Length, Date
//! ```
//!
//! Two guards nest here. [`Fsm::handle_exceptions`] wraps every node and the
//! finalizer's resource calls; the engine wraps [`Fsm::drive`] once more and
//! answers a fresh 500 if anything gets past the inner guard.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{error, trace, warn};

use crate::decision::helpers::{ensure_content_length, ensure_date_header};
use crate::decision::node::{Decision, Node};
use crate::decision::{FlowError, Outcome};
use crate::errors::ErrorRenderer;
use crate::http::headers::Headers;
use crate::http::response::{Response, ResponseBody, StatusCode};
use crate::resource::{Context, Resource};

/// Bounds on one traversal.
#[derive(Debug, Clone, Default)]
pub(crate) struct Limits {
    pub(crate) max_decisions: usize,
    pub(crate) deadline: Option<Instant>,
    pub(crate) cancel: Option<watch::Receiver<bool>>,
}

pub(crate) struct Fsm<'a> {
    pub(crate) resource: &'a mut dyn Resource,
    pub(crate) ctx: Context,
    renderer: &'a dyn ErrorRenderer,
    limits: Limits,
}

impl<'a> Fsm<'a> {
    pub(crate) fn new(
        resource: &'a mut dyn Resource,
        ctx: Context,
        renderer: &'a dyn ErrorRenderer,
        limits: Limits,
    ) -> Self {
        Self {
            resource,
            ctx,
            renderer,
            limits,
        }
    }

    /// Walks the graph from the entry node until a node answers with a
    /// status, then finalizes the response. Returns the number of decisions
    /// taken.
    ///
    /// Errors here are engine consistency failures: a status code outside
    /// 100–599, or a graph that never terminates.
    pub(crate) fn drive(&mut self) -> Outcome<usize> {
        let mut node = Node::START;
        let mut steps = 0;

        loop {
            if let Some(code) = self.interruption() {
                let status = StatusCode::new(code).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
                self.render_error(status, None);
                self.respond(code, Headers::new());
                return Ok(steps);
            }

            steps += 1;
            if steps > self.limits.max_decisions {
                return Err(FlowError::invalid(format!(
                    "decision graph did not terminate within {} decisions",
                    self.limits.max_decisions
                )));
            }

            trace!(node = %node, "decision");
            match self.handle_exceptions(|fsm| (node.decide())(fsm)) {
                Decision::Next(next) => node = next,
                Decision::Respond(code) if StatusCode::new(code).is_some() => {
                    self.respond(code, Headers::new());
                    return Ok(steps);
                }
                Decision::Respond(code) => {
                    return Err(FlowError::invalid(format!(
                        "node {node} answered with invalid status {code}"
                    )));
                }
            }
        }
    }

    /// Has the transport cancelled us, or has the deadline passed?
    fn interruption(&self) -> Option<u16> {
        if self.limits.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            warn!(path = %self.ctx.request.uri().path(), "Traversal cancelled by transport");
            return Some(StatusCode::SERVICE_UNAVAILABLE.as_u16());
        }
        if self.limits.deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(path = %self.ctx.request.uri().path(), "Traversal deadline exceeded");
            return Some(StatusCode::GATEWAY_TIMEOUT.as_u16());
        }
        None
    }

    /// Runs one step, turning every failure into a status.
    ///
    /// Malformed requests answer 400 with the failure message. A halt
    /// answers its own code. Anything else, panics included, goes through
    /// the resource's `handle_exception` hook and answers 500.
    pub(crate) fn handle_exceptions<F>(&mut self, step: F) -> Decision
    where
        F: FnOnce(&mut Self) -> Outcome<Decision>,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| step(self))).unwrap_or_else(|payload| {
            Err(FlowError::Resource(anyhow::anyhow!(
                "panic in resource callback: {}",
                panic_message(payload.as_ref())
            )))
        });

        match result {
            Ok(decision) => decision,
            Err(FlowError::Halt(code)) => Decision::Respond(code),
            Err(FlowError::MalformedRequest(message)) => {
                warn!(
                    method = %self.ctx.request.method(),
                    path = %self.ctx.request.uri().path(),
                    error = %message,
                    "Malformed request"
                );
                self.ctx.response.body = ResponseBody::Empty;
                self.render_error(StatusCode::BAD_REQUEST, Some(&message));
                Decision::Respond(StatusCode::BAD_REQUEST.as_u16())
            }
            Err(err) => {
                // anything left in the body now comes from the hook
                self.ctx.response.body = ResponseBody::Empty;
                self.resource.handle_exception(&mut self.ctx, &err);
                self.render_error(StatusCode::INTERNAL_SERVER_ERROR, None);
                Decision::Respond(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
            }
        }
    }

    /// Finalizes the response with `code`.
    ///
    /// The last two steps, `Content-Length` and `Date`, always run.
    pub(crate) fn respond(&mut self, code: u16, headers: Headers) {
        let status = StatusCode::new(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.ctx.response.status = Some(status);
        self.ctx.response.headers.merge(headers);

        match status {
            StatusCode::NOT_FOUND => self.render_error(status, None),
            StatusCode::NOT_MODIFIED => {
                self.ctx.response.headers.remove("Content-Type");
                let decision = self.handle_exceptions(|fsm| {
                    fsm.add_caching_headers()?;
                    Ok(Decision::Respond(StatusCode::NOT_MODIFIED.as_u16()))
                });
                self.set_final_status(decision);
            }
            _ => {}
        }

        let decision = self.handle_exceptions(|fsm| {
            fsm.resource.finish_request(&mut fsm.ctx)?;
            fsm.ctx.response.body.realize()?;
            let code = fsm
                .ctx
                .response
                .status
                .map(|s| s.as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
            Ok(Decision::Respond(code))
        });
        self.set_final_status(decision);

        ensure_content_length(&mut self.ctx.response);
        ensure_date_header(&mut self.ctx.response);
    }

    /// Sets `status` and lets the renderer write the error body. A renderer
    /// that panics leaves the response with `status` and no body.
    pub(crate) fn render_error(&mut self, status: StatusCode, message: Option<&str>) {
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
            self.renderer
                .render(status, &self.ctx.request, &mut self.ctx.response, message)
        }));
        if let Err(payload) = rendered {
            error!(
                status = status.as_u16(),
                error = %panic_message(payload.as_ref()),
                "Error renderer panicked"
            );
            self.ctx.response.status = Some(status);
            self.ctx.response.body = ResponseBody::Empty;
            self.ctx.response.headers.remove("Content-Type");
        }
    }

    fn set_final_status(&mut self, decision: Decision) {
        let status = match decision {
            Decision::Respond(code) => StatusCode::new(code),
            Decision::Next(_) => None,
        };
        self.ctx.response.status = Some(status.unwrap_or_else(|| {
            error!(decision = ?decision, "Finalizer produced no valid status");
            StatusCode::INTERNAL_SERVER_ERROR
        }));
    }

    /// Replaces whatever was built with a generic 500. Used when a failure
    /// got past the per-node guard.
    pub(crate) fn fail_safe(&mut self) {
        self.ctx.response = Response::new();
        self.render_error(StatusCode::INTERNAL_SERVER_ERROR, None);
        ensure_content_length(&mut self.ctx.response);
        ensure_date_header(&mut self.ctx.response);
    }

    pub(crate) fn into_response(self) -> Response {
        self.ctx.into_response()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
