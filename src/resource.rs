//! The capability interface a resource implements for the decision engine.
//!
//! Every callback has a default, so a resource overrides only what it
//! customizes. Callbacks return [`Outcome`]; returning
//! `Err(FlowError::Halt(code))` from any of them ends the traversal with
//! `code`.

use chrono::{DateTime, Utc};

use crate::decision::{FlowError, Metadata, Outcome};
use crate::http::conneg::MediaType;
use crate::http::headers::Headers;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBody};

use bytes::Bytes;

/// The request, the response under construction and the negotiation state
/// of one traversal.
///
/// Resources may freely modify the response. The request and metadata are
/// read-only to them.
#[derive(Debug)]
pub struct Context {
    pub(crate) request: Request,
    pub(crate) response: Response,
    pub(crate) metadata: Metadata,
}

impl Context {
    pub fn new(request: Request, response: Response) -> Self {
        Self {
            request,
            response,
            metadata: Metadata::new(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

/// Answer to [`Resource::is_authorized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    /// 401 without a challenge.
    Denied,
    /// 401 with this `WWW-Authenticate` value.
    Challenge(String),
}

#[allow(unused_variables)]
pub trait Resource {
    /// Is the server able to handle requests for this resource right now?
    /// `false` answers 503.
    fn service_available(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(true)
    }

    /// Methods the resource recognises at all. Anything else answers 501.
    fn known_methods(&mut self, ctx: &mut Context) -> Outcome<Vec<Method>> {
        Ok(Method::standard())
    }

    fn uri_too_long(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Methods the resource supports. Anything known but not listed answers
    /// 405 with an `Allow` header. Defaults to every known method.
    fn allowed_methods(&mut self, ctx: &mut Context) -> Outcome<Vec<Method>> {
        self.known_methods(ctx)
    }

    /// Validates a `Content-MD5` header against the body. `None` leaves the
    /// header unchecked.
    fn validate_content_checksum(&mut self, ctx: &mut Context) -> Outcome<Option<bool>> {
        Ok(None)
    }

    fn malformed_request(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Receives the `Authorization` header, if any.
    fn is_authorized(&mut self, ctx: &mut Context, authorization: Option<&str>) -> Outcome<Authorization> {
        Ok(Authorization::Granted)
    }

    fn forbidden(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Checks the request's `Content-*` headers. `false` answers 501.
    fn valid_content_headers(&mut self, ctx: &mut Context, headers: &Headers) -> Outcome<bool> {
        Ok(true)
    }

    /// `false` answers 415.
    fn known_content_type(&mut self, ctx: &mut Context, content_type: Option<&str>) -> Outcome<bool> {
        Ok(true)
    }

    /// `false` answers 413.
    fn valid_entity_length(&mut self, ctx: &mut Context, length: Option<usize>) -> Outcome<bool> {
        Ok(true)
    }

    /// Headers for an OPTIONS response.
    fn options(&mut self, ctx: &mut Context) -> Outcome<Headers> {
        Ok(Headers::new())
    }

    /// Media types the resource can produce, most preferred first.
    fn content_types_provided(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["text/html".to_string()])
    }

    /// Media types the resource can consume on PUT and POST.
    fn content_types_accepted(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(Vec::new())
    }

    /// Empty means the resource does no language negotiation.
    fn languages_provided(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(Vec::new())
    }

    /// Empty means the resource does no charset negotiation.
    fn charsets_provided(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(Vec::new())
    }

    /// Content codings the resource can apply through
    /// [`encode_body`](Resource::encode_body).
    fn encodings_provided(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(vec!["identity".to_string()])
    }

    /// Extra request headers the response varies on.
    fn variances(&mut self, ctx: &mut Context) -> Outcome<Vec<String>> {
        Ok(Vec::new())
    }

    fn resource_exists(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(true)
    }

    /// Quoted or bare; bare values are sent as strong tags.
    fn generate_etag(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    fn last_modified(&mut self, ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(None)
    }

    fn expires(&mut self, ctx: &mut Context) -> Outcome<Option<DateTime<Utc>>> {
        Ok(None)
    }

    fn cache_control(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    /// Where a resource that no longer lives here has moved for good.
    fn moved_permanently(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    fn moved_temporarily(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    fn previously_existed(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// May a POST create a resource that does not exist yet?
    fn allow_missing_post(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// When true, POST is handled like a PUT to
    /// [`create_path`](Resource::create_path).
    fn post_is_create(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Path of the new resource, resolved against
    /// [`base_uri`](Resource::base_uri).
    fn create_path(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    /// Base for `create_path`. Falls back to the request's base URI, then
    /// to the request URI.
    fn base_uri(&mut self, ctx: &mut Context) -> Outcome<Option<String>> {
        Ok(None)
    }

    /// Handles a POST that is not a create. `false` answers 500.
    fn process_post(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Starts the deletion. `false` answers 500.
    fn delete_resource(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// `false` means the deletion was accepted but has not finished (202).
    fn delete_completed(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(true)
    }

    fn is_conflict(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    fn multiple_choices(&mut self, ctx: &mut Context) -> Outcome<bool> {
        Ok(false)
    }

    /// Produces the body for the negotiated media type on GET and HEAD.
    fn render(&mut self, ctx: &mut Context, media_type: &MediaType) -> Outcome<ResponseBody> {
        Ok(ResponseBody::Empty)
    }

    /// Consumes a PUT or POST body of an accepted media type. `false`
    /// answers 500.
    fn accept(&mut self, ctx: &mut Context, media_type: &MediaType) -> Outcome<bool> {
        Ok(false)
    }

    /// Applies a content coding chosen from
    /// [`encodings_provided`](Resource::encodings_provided).
    fn encode_body(&mut self, ctx: &mut Context, encoding: &str, body: Bytes) -> Outcome<Bytes> {
        if encoding.eq_ignore_ascii_case("identity") {
            Ok(body)
        } else {
            Err(FlowError::invalid(format!("no encoder for content coding {encoding:?}")))
        }
    }

    /// Runs after the status is decided. May change it by editing
    /// `ctx.response_mut().status`.
    fn finish_request(&mut self, ctx: &mut Context) -> Outcome<()> {
        Ok(())
    }

    /// Sees every unexpected failure before it becomes a 500. A body set here
    /// replaces the generic error page.
    fn handle_exception(&mut self, ctx: &mut Context, error: &FlowError) {
        tracing::error!(
            method = %ctx.request().method(),
            path = %ctx.request().uri().path(),
            error = %error,
            "Resource failed while handling request"
        );
    }
}
