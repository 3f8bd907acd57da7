//! The decision functions, one per node of the HTTP decision diagram.
//!
//! Each function answers one question, usually by asking the resource, and
//! names either the next node or a status code. Node names follow the
//! diagram's grid coordinates so a trace reads against the picture.

use chrono::Utc;
use url::Url;

use crate::decision::fsm::Fsm;
use crate::decision::node::Decision::{self, Next, Respond};
use crate::decision::node::Node;
use crate::decision::{FlowError, Outcome};
use crate::http::conneg::{self, MediaType};
use crate::http::date;
use crate::http::etag::ETagCondition;
use crate::http::headers::Headers;
use crate::http::response::StatusCode;
use crate::resource::Authorization;

const DEFAULT_ENCODING_HEADER: &str = "identity;q=1.0,*;q=0.5";

fn next(node: Node) -> Outcome<Decision> {
    Ok(Next(node))
}

fn respond(status: StatusCode) -> Outcome<Decision> {
    Ok(Respond(status.as_u16()))
}

fn request_header(fsm: &Fsm<'_>, name: &str) -> Option<String> {
    fsm.ctx.request.header(name).map(str::to_string)
}

// List-valued headers may arrive as several field lines; they read as one
// comma-joined value.
fn list_header(fsm: &Fsm<'_>, name: &str) -> Option<String> {
    fsm.ctx.request.headers().get_joined(name)
}

fn etag_condition(fsm: &Fsm<'_>, name: &str) -> Outcome<Option<ETagCondition>> {
    list_header(fsm, name)
        .map(|value| {
            ETagCondition::parse(&value).map_err(|e| FlowError::malformed(format!("{name}: {e}")))
        })
        .transpose()
}

fn parse_offer(offer: &str) -> Outcome<MediaType> {
    MediaType::parse(offer)
        .ok_or_else(|| FlowError::invalid(format!("resource offers unparsable media type {offer:?}")))
}

fn set_encoding(fsm: &mut Fsm<'_>, encoding: String) {
    if !encoding.eq_ignore_ascii_case("identity") {
        fsm.ctx.response.set_header("Content-Encoding", encoding.clone());
    }
    fsm.ctx.metadata.set_encoding(encoding);
}

// Service available?
pub(crate) fn b13(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.service_available(&mut fsm.ctx)? {
        next(Node::B12)
    } else {
        respond(StatusCode::SERVICE_UNAVAILABLE)
    }
}

// Known method?
pub(crate) fn b12(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let known = fsm.resource.known_methods(&mut fsm.ctx)?;
    if known.contains(fsm.ctx.request.method()) {
        next(Node::B11)
    } else {
        respond(StatusCode::NOT_IMPLEMENTED)
    }
}

// URI too long?
pub(crate) fn b11(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.uri_too_long(&mut fsm.ctx)? {
        respond(StatusCode::URI_TOO_LONG)
    } else {
        next(Node::B10)
    }
}

// Method allowed?
pub(crate) fn b10(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let allowed = fsm.resource.allowed_methods(&mut fsm.ctx)?;
    if allowed.contains(fsm.ctx.request.method()) {
        return next(Node::B9);
    }
    let allow = allowed
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    fsm.ctx.response.set_header("Allow", allow);
    respond(StatusCode::METHOD_NOT_ALLOWED)
}

// Content-MD5 valid?
pub(crate) fn b9(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if !fsm.ctx.request.headers().contains("Content-MD5") {
        return next(Node::B9b);
    }
    match fsm.resource.validate_content_checksum(&mut fsm.ctx)? {
        Some(false) => Err(FlowError::malformed(
            "Content-MD5 header does not match request body.",
        )),
        Some(true) | None => next(Node::B9b),
    }
}

// Malformed?
pub(crate) fn b9b(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.malformed_request(&mut fsm.ctx)? {
        fsm.render_error(StatusCode::BAD_REQUEST, None);
        respond(StatusCode::BAD_REQUEST)
    } else {
        next(Node::B8)
    }
}

// Authorized?
pub(crate) fn b8(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let authorization = request_header(fsm, "Authorization");
    match fsm
        .resource
        .is_authorized(&mut fsm.ctx, authorization.as_deref())?
    {
        Authorization::Granted => next(Node::B7),
        Authorization::Denied => respond(StatusCode::UNAUTHORIZED),
        Authorization::Challenge(challenge) => {
            fsm.ctx.response.set_header("WWW-Authenticate", challenge);
            respond(StatusCode::UNAUTHORIZED)
        }
    }
}

// Forbidden?
pub(crate) fn b7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.forbidden(&mut fsm.ctx)? {
        respond(StatusCode::FORBIDDEN)
    } else {
        next(Node::B6)
    }
}

// Okay Content-* headers?
pub(crate) fn b6(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let content_headers: Headers = fsm
        .ctx
        .request
        .headers()
        .iter()
        .filter(|(name, _)| {
            name.get(..8)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("content-"))
        })
        .collect();
    if fsm
        .resource
        .valid_content_headers(&mut fsm.ctx, &content_headers)?
    {
        next(Node::B5)
    } else {
        respond(StatusCode::NOT_IMPLEMENTED)
    }
}

// Known Content-Type?
pub(crate) fn b5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let content_type = request_header(fsm, "Content-Type");
    if fsm
        .resource
        .known_content_type(&mut fsm.ctx, content_type.as_deref())?
    {
        next(Node::B4)
    } else {
        respond(StatusCode::UNSUPPORTED_MEDIA_TYPE)
    }
}

// Request entity too large?
pub(crate) fn b4(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let length = fsm.ctx.request.content_length();
    if length.is_none() && fsm.ctx.request.headers().contains("Content-Length") {
        return Err(FlowError::malformed("Content-Length header is not a valid length."));
    }
    if fsm.resource.valid_entity_length(&mut fsm.ctx, length)? {
        next(Node::B3)
    } else {
        respond(StatusCode::PAYLOAD_TOO_LARGE)
    }
}

// OPTIONS?
pub(crate) fn b3(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if !fsm.ctx.request.is_options() {
        return next(Node::C3);
    }
    let headers = fsm.resource.options(&mut fsm.ctx)?;
    fsm.ctx.response.headers.merge(headers);
    respond(StatusCode::OK)
}

// Accept exists?
pub(crate) fn c3(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("Accept") {
        return next(Node::C4);
    }
    let provided = fsm.resource.content_types_provided(&mut fsm.ctx)?;
    if let Some(first) = provided.first() {
        let media_type = parse_offer(first)?;
        fsm.ctx.metadata.set_content_type(media_type);
    }
    next(Node::D4)
}

// Acceptable media type available?
pub(crate) fn c4(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let accept = list_header(fsm, "Accept").unwrap_or_default();
    let provided = fsm.resource.content_types_provided(&mut fsm.ctx)?;
    if provided.is_empty() {
        return next(Node::D4);
    }
    match conneg::choose_media_type(&provided, &accept) {
        Some(media_type) => {
            fsm.ctx.metadata.set_content_type(media_type);
            next(Node::D4)
        }
        None => respond(StatusCode::NOT_ACCEPTABLE),
    }
}

// Accept-Language exists?
pub(crate) fn d4(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("Accept-Language") {
        return next(Node::D5);
    }
    let provided = fsm.resource.languages_provided(&mut fsm.ctx)?;
    if let Some(first) = provided.into_iter().next() {
        fsm.ctx.response.set_header("Content-Language", first.clone());
        fsm.ctx.metadata.set_language(first);
    }
    next(Node::E5)
}

// Acceptable language available?
pub(crate) fn d5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let accept_language = list_header(fsm, "Accept-Language").unwrap_or_default();
    let provided = fsm.resource.languages_provided(&mut fsm.ctx)?;
    if provided.is_empty() {
        return next(Node::E5);
    }
    match conneg::choose_language(&provided, &accept_language) {
        Some(language) => {
            fsm.ctx.response.set_header("Content-Language", language.clone());
            fsm.ctx.metadata.set_language(language);
            next(Node::E5)
        }
        None => respond(StatusCode::NOT_ACCEPTABLE),
    }
}

// Accept-Charset exists?
pub(crate) fn e5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("Accept-Charset") {
        return next(Node::E6);
    }
    let provided = fsm.resource.charsets_provided(&mut fsm.ctx)?;
    if let Some(first) = provided.into_iter().next() {
        fsm.ctx.metadata.set_charset(first);
    }
    next(Node::F6)
}

// Acceptable charset available?
pub(crate) fn e6(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let accept_charset = list_header(fsm, "Accept-Charset").unwrap_or_default();
    let provided = fsm.resource.charsets_provided(&mut fsm.ctx)?;
    if provided.is_empty() {
        return next(Node::F6);
    }
    match conneg::choose_charset(&provided, &accept_charset) {
        Some(charset) => {
            fsm.ctx.metadata.set_charset(charset);
            next(Node::F6)
        }
        None => respond(StatusCode::NOT_ACCEPTABLE),
    }
}

// Accept-Encoding exists?
// (also sets the Content-Type header from the negotiated type and charset)
pub(crate) fn f6(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if let Some(media_type) = fsm.ctx.metadata.content_type() {
        let value = match fsm.ctx.metadata.charset() {
            Some(charset) if media_type.param("charset").is_none() => {
                format!("{media_type}; charset={charset}")
            }
            _ => media_type.to_string(),
        };
        fsm.ctx.response.set_header("Content-Type", value);
    }

    if fsm.ctx.request.headers().contains("Accept-Encoding") {
        return next(Node::F7);
    }
    let provided = fsm.resource.encodings_provided(&mut fsm.ctx)?;
    if let Some(encoding) = conneg::choose_encoding(&provided, DEFAULT_ENCODING_HEADER) {
        set_encoding(fsm, encoding);
    }
    next(Node::G7)
}

// Acceptable encoding available?
pub(crate) fn f7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let accept_encoding = list_header(fsm, "Accept-Encoding").unwrap_or_default();
    let provided = fsm.resource.encodings_provided(&mut fsm.ctx)?;
    if provided.is_empty() {
        return next(Node::G7);
    }
    match conneg::choose_encoding(&provided, &accept_encoding) {
        Some(encoding) => {
            set_encoding(fsm, encoding);
            next(Node::G7)
        }
        None => respond(StatusCode::NOT_ACCEPTABLE),
    }
}

// Resource exists?
// (also sets the Vary header)
pub(crate) fn g7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let mut vary = Vec::new();
    if fsm.resource.content_types_provided(&mut fsm.ctx)?.len() > 1 {
        vary.push("Accept".to_string());
    }
    if fsm.resource.encodings_provided(&mut fsm.ctx)?.len() > 1 {
        vary.push("Accept-Encoding".to_string());
    }
    if fsm.resource.charsets_provided(&mut fsm.ctx)?.len() > 1 {
        vary.push("Accept-Charset".to_string());
    }
    if fsm.resource.languages_provided(&mut fsm.ctx)?.len() > 1 {
        vary.push("Accept-Language".to_string());
    }
    vary.extend(fsm.resource.variances(&mut fsm.ctx)?);
    if !vary.is_empty() {
        fsm.ctx.response.set_header("Vary", vary.join(", "));
    }

    if fsm.resource.resource_exists(&mut fsm.ctx)? {
        next(Node::G8)
    } else {
        next(Node::H7)
    }
}

// If-Match exists?
pub(crate) fn g8(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("If-Match") {
        next(Node::G9)
    } else {
        next(Node::H10)
    }
}

// If-Match: * exists?
pub(crate) fn g9(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match etag_condition(fsm, "If-Match")? {
        Some(ETagCondition::Any) => next(Node::H10),
        _ => next(Node::G11),
    }
}

// ETag in If-Match?
pub(crate) fn g11(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let Some(ETagCondition::Tags(tags)) = etag_condition(fsm, "If-Match")? else {
        return next(Node::H10);
    };
    // without an ETag there is nothing to compare; the condition is skipped
    let Some(current) = fsm.etag()? else {
        return next(Node::H10);
    };
    if tags.iter().any(|tag| tag.strong_eq(&current)) {
        next(Node::H10)
    } else {
        respond(StatusCode::PRECONDITION_FAILED)
    }
}

// If-Match: * exists?
pub(crate) fn h7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match etag_condition(fsm, "If-Match")? {
        Some(ETagCondition::Any) => respond(StatusCode::PRECONDITION_FAILED),
        _ => next(Node::I7),
    }
}

// If-Unmodified-Since exists?
pub(crate) fn h10(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("If-Unmodified-Since") {
        next(Node::H11)
    } else {
        next(Node::I12)
    }
}

// If-Unmodified-Since is valid date?
pub(crate) fn h11(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match request_header(fsm, "If-Unmodified-Since").and_then(|v| date::parse(&v)) {
        Some(_) => next(Node::H12),
        None => next(Node::I12),
    }
}

// Last-Modified > If-Unmodified-Since?
pub(crate) fn h12(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let Some(since) = request_header(fsm, "If-Unmodified-Since").and_then(|v| date::parse(&v))
    else {
        return next(Node::I12);
    };
    match fsm.last_modified()? {
        Some(modified) if modified.timestamp() > since.timestamp() => {
            respond(StatusCode::PRECONDITION_FAILED)
        }
        _ => next(Node::I12),
    }
}

// Moved permanently? (apply PUT to different URI)
pub(crate) fn i4(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match fsm.resource.moved_permanently(&mut fsm.ctx)? {
        Some(location) => {
            fsm.ctx.response.set_header("Location", location);
            respond(StatusCode::MOVED_PERMANENTLY)
        }
        None => next(Node::P3),
    }
}

// PUT?
pub(crate) fn i7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_put() {
        next(Node::I4)
    } else {
        next(Node::K7)
    }
}

// If-None-Match exists?
pub(crate) fn i12(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("If-None-Match") {
        next(Node::I13)
    } else {
        next(Node::L13)
    }
}

// If-None-Match: * exists?
pub(crate) fn i13(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match etag_condition(fsm, "If-None-Match")? {
        Some(ETagCondition::Any) => next(Node::J18),
        _ => next(Node::K13),
    }
}

// GET or HEAD?
pub(crate) fn j18(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_get() || fsm.ctx.request.is_head() {
        respond(StatusCode::NOT_MODIFIED)
    } else {
        respond(StatusCode::PRECONDITION_FAILED)
    }
}

// Moved permanently?
pub(crate) fn k5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match fsm.resource.moved_permanently(&mut fsm.ctx)? {
        Some(location) => {
            fsm.ctx.response.set_header("Location", location);
            respond(StatusCode::MOVED_PERMANENTLY)
        }
        None => next(Node::L5),
    }
}

// Previously existed?
pub(crate) fn k7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.previously_existed(&mut fsm.ctx)? {
        next(Node::K5)
    } else {
        next(Node::L7)
    }
}

// ETag in If-None-Match?
pub(crate) fn k13(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let Some(ETagCondition::Tags(tags)) = etag_condition(fsm, "If-None-Match")? else {
        return next(Node::L13);
    };
    match fsm.etag()? {
        Some(current) if tags.iter().any(|tag| tag.weak_eq(&current)) => next(Node::J18),
        _ => next(Node::L13),
    }
}

// Moved temporarily?
pub(crate) fn l5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match fsm.resource.moved_temporarily(&mut fsm.ctx)? {
        Some(location) => {
            fsm.ctx.response.set_header("Location", location);
            respond(StatusCode::TEMPORARY_REDIRECT)
        }
        None => next(Node::M5),
    }
}

// POST?
pub(crate) fn l7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_post() {
        next(Node::M7)
    } else {
        respond(StatusCode::NOT_FOUND)
    }
}

// If-Modified-Since exists?
pub(crate) fn l13(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.headers().contains("If-Modified-Since") {
        next(Node::L14)
    } else {
        next(Node::M16)
    }
}

// If-Modified-Since is valid date?
pub(crate) fn l14(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match request_header(fsm, "If-Modified-Since").and_then(|v| date::parse(&v)) {
        Some(_) => next(Node::L15),
        None => next(Node::M16),
    }
}

// If-Modified-Since > Now?
pub(crate) fn l15(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    match request_header(fsm, "If-Modified-Since").and_then(|v| date::parse(&v)) {
        Some(since) if since > Utc::now() => next(Node::M16),
        Some(_) => next(Node::L17),
        None => next(Node::M16),
    }
}

// Last-Modified > If-Modified-Since?
pub(crate) fn l17(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    let Some(since) = request_header(fsm, "If-Modified-Since").and_then(|v| date::parse(&v)) else {
        return next(Node::M16);
    };
    match fsm.last_modified()? {
        Some(modified) if modified.timestamp() <= since.timestamp() => {
            respond(StatusCode::NOT_MODIFIED)
        }
        _ => next(Node::M16),
    }
}

// POST?
pub(crate) fn m5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_post() {
        next(Node::N5)
    } else {
        respond(StatusCode::GONE)
    }
}

// Server allows POST to missing resource?
pub(crate) fn m7(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.allow_missing_post(&mut fsm.ctx)? {
        next(Node::N11)
    } else {
        respond(StatusCode::NOT_FOUND)
    }
}

// DELETE?
pub(crate) fn m16(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_delete() {
        next(Node::M20)
    } else {
        next(Node::N16)
    }
}

// DELETE enacted immediately? (also where DELETE is forwarded)
pub(crate) fn m20(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.delete_resource(&mut fsm.ctx)? {
        next(Node::M20b)
    } else {
        respond(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

// Did the DELETE complete?
pub(crate) fn m20b(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.delete_completed(&mut fsm.ctx)? {
        next(Node::O20)
    } else {
        respond(StatusCode::ACCEPTED)
    }
}

// Server allows POST to missing resource?
pub(crate) fn n5(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.allow_missing_post(&mut fsm.ctx)? {
        next(Node::N11)
    } else {
        respond(StatusCode::GONE)
    }
}

// Redirect?
pub(crate) fn n11(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.post_is_create(&mut fsm.ctx)? {
        let Some(path) = fsm.resource.create_path(&mut fsm.ctx)? else {
            return Err(FlowError::invalid("post_is_create returned true but create_path is empty"));
        };
        let base = match fsm.resource.base_uri(&mut fsm.ctx)? {
            Some(base) => Url::parse(&base)
                .map_err(|e| FlowError::invalid(format!("invalid base_uri {base:?}: {e}")))?,
            None => fsm
                .ctx
                .request
                .base_uri()
                .unwrap_or(fsm.ctx.request.uri())
                .clone(),
        };
        let location = base
            .join(&path)
            .map_err(|e| FlowError::invalid(format!("invalid create_path {path:?}: {e}")))?;
        fsm.ctx.response.set_header("Location", location.to_string());

        if let Some(decision) = fsm.accept_helper()? {
            return Ok(decision);
        }
    } else if !fsm.resource.process_post(&mut fsm.ctx)? {
        return respond(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if fsm.ctx.response.is_redirect() {
        if fsm.ctx.response.headers.contains("Location") {
            respond(StatusCode::SEE_OTHER)
        } else {
            Err(FlowError::invalid("response asked for a redirect but has no Location"))
        }
    } else {
        next(Node::P11)
    }
}

// POST?
pub(crate) fn n16(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_post() {
        next(Node::N11)
    } else {
        next(Node::O16)
    }
}

// Conflict?
pub(crate) fn o14(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.is_conflict(&mut fsm.ctx)? {
        return respond(StatusCode::CONFLICT);
    }
    match fsm.accept_helper()? {
        Some(decision) => Ok(decision),
        None => next(Node::P11),
    }
}

// PUT?
pub(crate) fn o16(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_put() {
        next(Node::O14)
    } else {
        next(Node::O18)
    }
}

// Multiple representations?
// (also where body generation for GET and HEAD is done)
pub(crate) fn o18(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.request.is_get() || fsm.ctx.request.is_head() {
        fsm.add_caching_headers()?;
        if let Some(media_type) = fsm.ctx.metadata.content_type().cloned() {
            let body = fsm.resource.render(&mut fsm.ctx, &media_type)?;
            fsm.ctx.response.body = body;
            fsm.encode_body()?;
        }
    }

    if fsm.resource.multiple_choices(&mut fsm.ctx)? {
        respond(StatusCode::MULTIPLE_CHOICES)
    } else {
        respond(StatusCode::OK)
    }
}

// Response includes an entity?
pub(crate) fn o20(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.response.has_body() {
        next(Node::O18)
    } else {
        respond(StatusCode::NO_CONTENT)
    }
}

// Conflict?
pub(crate) fn p3(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.resource.is_conflict(&mut fsm.ctx)? {
        return respond(StatusCode::CONFLICT);
    }
    match fsm.accept_helper()? {
        Some(decision) => Ok(decision),
        None => next(Node::P11),
    }
}

// New resource?
pub(crate) fn p11(fsm: &mut Fsm<'_>) -> Outcome<Decision> {
    if fsm.ctx.response.headers.contains("Location") {
        respond(StatusCode::CREATED)
    } else {
        next(Node::O20)
    }
}
