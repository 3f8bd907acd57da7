//! Standard error bodies.
//!
//! The engine renders 400, 404 and the 500 fallbacks through an
//! [`ErrorRenderer`]. Hosts can inject their own via
//! [`Engine::with_renderer`](crate::decision::Engine::with_renderer).

use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Produces the body of an error response.
pub trait ErrorRenderer: Send + Sync {
    /// Sets `response` to `status` and writes an error body when the
    /// response has none yet.
    fn render(&self, status: StatusCode, request: &Request, response: &mut Response, message: Option<&str>);
}

/// Renders small HTML pages, e.g.
/// `<h1>Not Found</h1><p>The requested document was not found on this server.</p>`.
#[derive(Debug, Clone)]
pub struct HtmlErrorRenderer {
    server_name: String,
}

impl HtmlErrorRenderer {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }

    fn default_message(status: StatusCode, request: &Request) -> String {
        match status.as_u16() {
            400 => "The request could not be understood by the server.".to_string(),
            404 => "The requested document was not found on this server.".to_string(),
            500 => "The server encountered an error while processing this request.".to_string(),
            503 => "The server is currently unable to handle the request.".to_string(),
            _ => format!("{} {}", request.method(), request.uri().path()),
        }
    }
}

impl Default for HtmlErrorRenderer {
    fn default() -> Self {
        Self::new("webmachine-rs")
    }
}

impl ErrorRenderer for HtmlErrorRenderer {
    fn render(&self, status: StatusCode, request: &Request, response: &mut Response, message: Option<&str>) {
        response.status = Some(status);
        if response.has_body() {
            return;
        }

        let message = message
            .map(escape_html)
            .unwrap_or_else(|| Self::default_message(status, request));
        let body = format!(
            "<!DOCTYPE html><html><head><title>{status}</title></head>\
             <body><h1>{reason}</h1><p>{message}</p><hr><address>{server}</address></body></html>",
            reason = status.reason_phrase(),
            server = escape_html(&self.server_name),
        );
        response.set_header("Content-Type", "text/html");
        response.set_body(body);
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
