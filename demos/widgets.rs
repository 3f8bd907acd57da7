//! Drives a small in-memory widget catalogue through the engine.
//!
//! No socket is opened; requests are built in-process and the finished
//! responses are printed the way a transport would write them.
//!
//! ```text
//! cargo run --example widgets
//! WEBMACHINE_LOG=debug cargo run --example widgets
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::info;
use webmachine::config::Config;
use webmachine::decision::Engine;
use webmachine::http::conneg::MediaType;
use webmachine::http::date;
use webmachine::http::request::{Method, Request, RequestBuilder};
use webmachine::http::response::{Response, ResponseBody};
use webmachine::observability::init_tracing;
use webmachine::{Context, FlowError, Outcome, Resource};

type Store = Arc<Mutex<BTreeMap<String, (Value, DateTime<Utc>)>>>;

struct Catalogue {
    store: Store,
}

impl Catalogue {
    fn id(ctx: &Context) -> Option<String> {
        ctx.request()
            .uri()
            .path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn lookup(&self, ctx: &Context) -> Outcome<Option<(Value, DateTime<Utc>)>> {
        let store = self
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("widget store poisoned"))?;
        Ok(Self::id(ctx).and_then(|id| store.get(&id).cloned()))
    }
}

impl Resource for Catalogue {
    fn allowed_methods(&mut self, _ctx: &mut Context) -> Outcome<Vec<Method>> {
        Ok(vec![Method::GET, Method::HEAD, Method::PUT, Method::DELETE])
    }

    fn malformed_request(&mut self, ctx: &mut Context) -> Outcome<bool> {
        if Self::id(ctx).is_none() {
            return Err(FlowError::malformed("a widget id is required"));
        }
        Ok(false)
    }

    fn content_types_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["application/json".to_string(), "text/plain".to_string()])
    }

    fn content_types_accepted(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["application/json".to_string()])
    }

    fn encodings_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["identity".to_string(), "x-upper".to_string()])
    }

    fn resource_exists(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(self.lookup(ctx)?.is_some())
    }

    fn generate_etag(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self
            .lookup(ctx)?
            .map(|(_, updated)| format!("w-{}", updated.timestamp_millis())))
    }

    fn last_modified(&mut self, ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(self.lookup(ctx)?.map(|(_, updated)| updated))
    }

    fn cache_control(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(Some("max-age=30".to_string()))
    }

    fn render(&mut self, ctx: &mut Context, media_type: &MediaType) -> Outcome<ResponseBody> {
        let Some((widget, _)) = self.lookup(ctx)? else {
            return Err(FlowError::Halt(404));
        };
        if media_type.essence() == "text/plain" {
            let name = widget["name"].as_str().unwrap_or("unnamed");
            return Ok(format!("widget {name}\n").into());
        }
        let body = serde_json::to_vec(&widget).map_err(anyhow::Error::from)?;
        Ok(body.into())
    }

    fn accept(&mut self, ctx: &mut Context, _media_type: &MediaType) -> Outcome<bool> {
        let raw = ctx.request().body().to_bytes().map_err(anyhow::Error::from)?;
        let widget: Value = serde_json::from_slice(&raw)
            .map_err(|e| FlowError::malformed(format!("widget body is not JSON: {e}")))?;
        let Some(id) = Self::id(ctx) else {
            return Ok(false);
        };
        self.store
            .lock()
            .map_err(|_| anyhow::anyhow!("widget store poisoned"))?
            .insert(id, (widget, Utc::now()));
        Ok(true)
    }

    fn delete_resource(&mut self, ctx: &mut Context) -> Outcome<bool> {
        let Some(id) = Self::id(ctx) else {
            return Ok(false);
        };
        let removed = self
            .store
            .lock()
            .map_err(|_| anyhow::anyhow!("widget store poisoned"))?
            .remove(&id);
        Ok(removed.is_some())
    }

    fn encode_body(&mut self, _ctx: &mut Context, encoding: &str, body: Bytes) -> Outcome<Bytes> {
        match encoding {
            "identity" => Ok(body),
            "x-upper" => Ok(body.to_ascii_uppercase().into()),
            other => Err(FlowError::invalid(format!("no encoder for {other}"))),
        }
    }
}

fn print_response(label: &str, response: &Response) {
    println!("--- {label}");
    match response.status {
        Some(status) => println!("HTTP/1.1 {status}"),
        None => println!("HTTP/1.1 (no status)"),
    }
    for (name, value) in response.headers.iter() {
        println!("{name}: {value}");
    }
    println!();
    if !response.body_bytes().is_empty() {
        println!("{}", String::from_utf8_lossy(response.body_bytes()));
    }
}

fn request(method: Method, path: &str) -> RequestBuilder {
    RequestBuilder::new()
        .method(method)
        .uri(format!("http://localhost:8080{path}"))
}

async fn script(engine: &Engine, store: Store) -> anyhow::Result<()> {
    let catalogue = || Box::new(Catalogue { store: store.clone() });
    let send = |req: Request| engine.run_async(catalogue(), req, Response::new(), None);

    let put = request(Method::PUT, "/widgets/1")
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&json!({"name": "sprocket", "teeth": 12}))?)
        .build()?;
    print_response("PUT /widgets/1", &send(put).await);

    let response = send(request(Method::GET, "/widgets/1").build()?).await;
    print_response("GET /widgets/1", &response);

    if let Some(etag) = response.header("ETag") {
        let conditional = request(Method::GET, "/widgets/1")
            .header("If-None-Match", etag)
            .build()?;
        print_response("GET /widgets/1 (If-None-Match)", &send(conditional).await);
    }

    let plain = request(Method::GET, "/widgets/1")
        .header("Accept", "text/plain")
        .header("Accept-Encoding", "x-upper")
        .build()?;
    print_response("GET /widgets/1 (text/plain, x-upper)", &send(plain).await);

    let stale = request(Method::PUT, "/widgets/1")
        .header("Content-Type", "application/json")
        .header("If-Unmodified-Since", date::format(&DateTime::<Utc>::UNIX_EPOCH))
        .body("{}")
        .build()?;
    print_response("PUT /widgets/1 (stale If-Unmodified-Since)", &send(stale).await);

    let broken = request(Method::PUT, "/widgets/2")
        .header("Content-Type", "application/json")
        .body("{oops")
        .build()?;
    print_response("PUT /widgets/2 (bad JSON)", &send(broken).await);

    print_response(
        "POST /widgets/1",
        &send(request(Method::POST, "/widgets/1").build()?).await,
    );
    print_response(
        "DELETE /widgets/1",
        &send(request(Method::DELETE, "/widgets/1").build()?).await,
    );
    print_response(
        "GET /widgets/1 (after delete)",
        &send(request(Method::GET, "/widgets/1").build()?).await,
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    init_tracing(&cfg.logging)?;

    let engine = Engine::new(cfg.engine);
    let store: Store = Arc::default();
    info!(server_name = %engine.config().server_name, "Running widget demo");

    tokio::select! {
        res = script(&engine, store) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
