//! Fixture resources shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use webmachine::http::conneg::MediaType;
use webmachine::http::headers::Headers;
use webmachine::http::request::{Method, Request, RequestBuilder};
use webmachine::http::response::{Response, ResponseBody, StatusCode};
use webmachine::{Authorization, Context, Engine, FlowError, Outcome, Resource};

pub const BASE: &str = "http://example.com";

pub fn request(method: Method, path: &str) -> RequestBuilder {
    RequestBuilder::new().method(method).uri(format!("{BASE}{path}"))
}

pub fn get(path: &str) -> RequestBuilder {
    request(Method::GET, path)
}

pub fn run(resource: &mut dyn Resource, request: Request) -> Response {
    Engine::default().run(resource, request, Response::new())
}

pub fn body_str(response: &Response) -> String {
    String::from_utf8_lossy(response.body_bytes()).into_owned()
}

pub fn content_length(response: &Response) -> usize {
    response
        .header("Content-Length")
        .expect("Content-Length present")
        .parse()
        .expect("Content-Length numeric")
}

/// Which callback should fail, and how.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Error(&'static str),
    Malformed(&'static str, String),
    Panic(&'static str),
    Halt(&'static str, u16),
}

/// A resource whose every answer is a public field.
pub struct Configurable {
    pub available: bool,
    pub allowed: Vec<Method>,
    pub exists: bool,
    pub provided: Vec<String>,
    pub accepted: Vec<String>,
    pub languages: Vec<String>,
    pub charsets: Vec<String>,
    pub encodings: Vec<String>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub cache_control: Option<String>,
    pub body: String,
    pub stream_body: Option<Vec<Result<&'static str, &'static str>>>,
    pub authorization: Authorization,
    pub malformed: bool,
    pub forbidden: bool,
    pub uri_too_long: bool,
    pub known_content_type: bool,
    pub valid_entity_length: bool,
    pub valid_content_headers: bool,
    pub checksum: Option<bool>,
    pub options: Vec<(String, String)>,
    pub moved_permanently: Option<String>,
    pub moved_temporarily: Option<String>,
    pub previously_existed: bool,
    pub allow_missing_post: bool,
    pub post_is_create: bool,
    pub create_path: Option<String>,
    pub process_post: bool,
    pub redirect_after_post: bool,
    pub accept_ok: bool,
    pub conflict: bool,
    pub delete_ok: bool,
    pub delete_completed: bool,
    pub multiple_choices: bool,
    pub finish_status: Option<u16>,
    pub finish_date: Option<String>,
    pub exception_body: Option<String>,
    pub failure: Option<Failure>,
    pub accepted_bodies: Vec<(String, Bytes)>,
    pub handled_exceptions: Vec<String>,
    pub finished: usize,
}

impl Default for Configurable {
    fn default() -> Self {
        Self {
            available: true,
            allowed: vec![Method::GET, Method::HEAD, Method::POST, Method::PUT, Method::DELETE],
            exists: true,
            provided: vec!["text/plain".to_string()],
            accepted: vec!["application/json".to_string()],
            languages: Vec::new(),
            charsets: Vec::new(),
            encodings: vec!["identity".to_string()],
            etag: None,
            last_modified: None,
            expires: None,
            cache_control: None,
            body: "hello".to_string(),
            stream_body: None,
            authorization: Authorization::Granted,
            malformed: false,
            forbidden: false,
            uri_too_long: false,
            known_content_type: true,
            valid_entity_length: true,
            valid_content_headers: true,
            checksum: None,
            options: Vec::new(),
            moved_permanently: None,
            moved_temporarily: None,
            previously_existed: false,
            allow_missing_post: false,
            post_is_create: false,
            create_path: None,
            process_post: true,
            redirect_after_post: false,
            accept_ok: true,
            conflict: false,
            delete_ok: true,
            delete_completed: true,
            multiple_choices: false,
            finish_status: None,
            finish_date: None,
            exception_body: None,
            failure: None,
            accepted_bodies: Vec::new(),
            handled_exceptions: Vec::new(),
            finished: 0,
        }
    }
}

impl Configurable {
    fn check(&self, callback: &'static str) -> Outcome<()> {
        match &self.failure {
            Some(Failure::Error(name)) if *name == callback => {
                Err(anyhow::anyhow!("{callback} blew up").into())
            }
            Some(Failure::Malformed(name, message)) if *name == callback => {
                Err(FlowError::malformed(message.clone()))
            }
            Some(Failure::Panic(name)) if *name == callback => panic!("{callback} panicked"),
            Some(Failure::Halt(name, code)) if *name == callback => Err(FlowError::Halt(*code)),
            _ => Ok(()),
        }
    }
}

impl Resource for Configurable {
    fn service_available(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        self.check("service_available")?;
        Ok(self.available)
    }

    fn allowed_methods(&mut self, _ctx: &mut Context) -> Outcome<Vec<Method>> {
        Ok(self.allowed.clone())
    }

    fn uri_too_long(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.uri_too_long)
    }

    fn validate_content_checksum(&mut self, _ctx: &mut Context) -> Outcome<Option<bool>> {
        Ok(self.checksum)
    }

    fn malformed_request(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        self.check("malformed_request")?;
        Ok(self.malformed)
    }

    fn is_authorized(&mut self, _ctx: &mut Context, _authorization: Option<&str>) -> Outcome<Authorization> {
        Ok(self.authorization.clone())
    }

    fn forbidden(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.forbidden)
    }

    fn valid_content_headers(&mut self, _ctx: &mut Context, _headers: &Headers) -> Outcome<bool> {
        Ok(self.valid_content_headers)
    }

    fn known_content_type(&mut self, _ctx: &mut Context, _content_type: Option<&str>) -> Outcome<bool> {
        Ok(self.known_content_type)
    }

    fn valid_entity_length(&mut self, _ctx: &mut Context, _length: Option<usize>) -> Outcome<bool> {
        Ok(self.valid_entity_length)
    }

    fn options(&mut self, _ctx: &mut Context) -> Outcome<Headers> {
        Ok(self.options.iter().cloned().collect())
    }

    fn content_types_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(self.provided.clone())
    }

    fn content_types_accepted(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(self.accepted.clone())
    }

    fn languages_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(self.languages.clone())
    }

    fn charsets_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(self.charsets.clone())
    }

    fn encodings_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(self.encodings.clone())
    }

    fn resource_exists(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        self.check("resource_exists")?;
        Ok(self.exists)
    }

    fn generate_etag(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        self.check("generate_etag")?;
        Ok(self.etag.clone())
    }

    fn last_modified(&mut self, _ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(self.last_modified)
    }

    fn expires(&mut self, _ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(self.expires)
    }

    fn cache_control(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self.cache_control.clone())
    }

    fn moved_permanently(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self.moved_permanently.clone())
    }

    fn moved_temporarily(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self.moved_temporarily.clone())
    }

    fn previously_existed(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.previously_existed)
    }

    fn allow_missing_post(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.allow_missing_post)
    }

    fn post_is_create(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.post_is_create)
    }

    fn create_path(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self.create_path.clone())
    }

    fn process_post(&mut self, ctx: &mut Context) -> Outcome<bool> {
        self.check("process_post")?;
        if self.redirect_after_post {
            ctx.response_mut().do_redirect();
        }
        Ok(self.process_post)
    }

    fn delete_resource(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.delete_ok)
    }

    fn delete_completed(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.delete_completed)
    }

    fn is_conflict(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.conflict)
    }

    fn multiple_choices(&mut self, _ctx: &mut Context) -> Outcome<bool> {
        Ok(self.multiple_choices)
    }

    fn render(&mut self, _ctx: &mut Context, media_type: &MediaType) -> Outcome<ResponseBody> {
        self.check("render")?;
        if let Some(chunks) = &self.stream_body {
            let chunks: Vec<anyhow::Result<Bytes>> = chunks
                .iter()
                .map(|c| match *c {
                    Ok(s) => Ok(Bytes::from_static(s.as_bytes())),
                    Err(e) => Err(anyhow::anyhow!(e)),
                })
                .collect();
            return Ok(ResponseBody::stream(chunks));
        }
        Ok(format!("{} as {}", self.body, media_type.essence()).into())
    }

    fn accept(&mut self, ctx: &mut Context, media_type: &MediaType) -> Outcome<bool> {
        self.check("accept")?;
        let body = ctx
            .request()
            .body()
            .to_bytes()
            .map_err(anyhow::Error::from)?;
        self.accepted_bodies.push((media_type.essence(), body));
        if self.redirect_after_post {
            ctx.response_mut().do_redirect();
        }
        Ok(self.accept_ok)
    }

    fn encode_body(&mut self, _ctx: &mut Context, encoding: &str, body: Bytes) -> Outcome<Bytes> {
        match encoding {
            "identity" => Ok(body),
            "reverse" => Ok(body.iter().rev().copied().collect::<Vec<u8>>().into()),
            other => Err(FlowError::invalid(format!("no encoder for {other}"))),
        }
    }

    fn finish_request(&mut self, ctx: &mut Context) -> Outcome<()> {
        self.finished += 1;
        if let Some(date) = &self.finish_date {
            ctx.response_mut().set_header("Date", date.clone());
        }
        if let Some(code) = self.finish_status {
            ctx.response_mut().status = StatusCode::new(code);
        }
        self.check("finish_request")
    }

    fn handle_exception(&mut self, ctx: &mut Context, error: &FlowError) {
        self.handled_exceptions.push(error.to_string());
        if let Some(body) = &self.exception_body {
            ctx.response_mut().set_body(body.clone());
        }
    }
}

/// An in-memory widget collection addressed as `/widgets/{id}`.
#[derive(Default)]
pub struct Widgets {
    pub store: BTreeMap<String, serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Widgets {
    pub fn with(id: &str, value: serde_json::Value) -> Self {
        let mut widgets = Widgets::default();
        widgets.store.insert(id.to_string(), value);
        widgets
    }

    fn id(ctx: &Context) -> String {
        ctx.request()
            .path_info("id")
            .map(str::to_string)
            .or_else(|| {
                ctx.request()
                    .uri()
                    .path_segments()
                    .and_then(|mut s| s.next_back().map(str::to_string))
            })
            .unwrap_or_default()
    }
}

impl Resource for Widgets {
    fn allowed_methods(&mut self, _ctx: &mut Context) -> Outcome<Vec<Method>> {
        Ok(vec![Method::GET, Method::HEAD, Method::PUT, Method::DELETE])
    }

    fn content_types_provided(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["application/json".to_string()])
    }

    fn content_types_accepted(&mut self, _ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["application/json".to_string()])
    }

    fn resource_exists(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(self.store.contains_key(&Self::id(ctx)))
    }

    fn generate_etag(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(self
            .store
            .get(&Self::id(ctx))
            .map(|v| format!("w{}", v.to_string().len())))
    }

    fn last_modified(&mut self, _ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(self.updated_at)
    }

    fn cache_control(&mut self, _ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(Some("max-age=60".to_string()))
    }

    fn render(&mut self, ctx: &mut Context, _media_type: &MediaType) -> Outcome<ResponseBody> {
        let widget = self
            .store
            .get(&Self::id(ctx))
            .ok_or_else(|| FlowError::Halt(404))?;
        Ok(widget.to_string().into())
    }

    fn accept(&mut self, ctx: &mut Context, _media_type: &MediaType) -> Outcome<bool> {
        let raw = ctx.request().body().to_bytes().map_err(anyhow::Error::from)?;
        let value: serde_json::Value = serde_json::from_slice(&raw)
            .map_err(|e| FlowError::malformed(format!("invalid widget JSON: {e}")))?;
        self.store.insert(Self::id(ctx), value);
        Ok(true)
    }

    fn delete_resource(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(self.store.remove(&Self::id(ctx)).is_some())
    }
}
