use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::decision::fsm::Fsm;
use crate::decision::node::Decision;
use crate::decision::{FlowError, Outcome};
use crate::http::conneg::MediaType;
use crate::http::date;
use crate::http::etag::ETag;
use crate::http::response::{Response, ResponseBody, StatusCode};

/// Sets `Content-Length` to the byte length of the realized body.
pub(crate) fn ensure_content_length(response: &mut Response) {
    // an unrealized stream has no known length and is not sent
    if matches!(response.body, ResponseBody::Stream(_)) {
        response.body = ResponseBody::Empty;
    }
    let length = response.body.len().unwrap_or(0);
    response.set_header("Content-Length", length.to_string());
}

/// Adds a `Date` header unless one is already present.
pub(crate) fn ensure_date_header(response: &mut Response) {
    if !response.headers.contains("Date") {
        response.set_header("Date", date::format(&Utc::now()));
    }
}

impl Fsm<'_> {
    /// The resource's ETag, asked for once per traversal.
    pub(crate) fn etag(&mut self) -> Outcome<Option<ETag>> {
        if let Some(cached) = self.ctx.metadata.cached_etag() {
            return Ok(cached);
        }
        let etag = self
            .resource
            .generate_etag(&mut self.ctx)?
            .map(|value| ETag::from_resource(&value));
        self.ctx.metadata.cache_etag(etag.clone());
        Ok(etag)
    }

    /// The resource's last-modified time, asked for once per traversal.
    pub(crate) fn last_modified(&mut self) -> Outcome<Option<DateTime<Utc>>> {
        if let Some(cached) = self.ctx.metadata.cached_last_modified() {
            return Ok(cached);
        }
        let last_modified = self.resource.last_modified(&mut self.ctx)?;
        self.ctx.metadata.cache_last_modified(last_modified);
        Ok(last_modified)
    }

    /// Adds whichever validators and cache directives the resource computes.
    pub(crate) fn add_caching_headers(&mut self) -> Outcome<()> {
        if let Some(etag) = self.etag()? {
            self.ctx.response.set_header("ETag", etag.to_string());
        }
        if let Some(modified) = self.last_modified()? {
            self.ctx.response.set_header("Last-Modified", date::format(&modified));
        }
        if let Some(expires) = self.resource.expires(&mut self.ctx)? {
            self.ctx.response.set_header("Expires", date::format(&expires));
        }
        if let Some(directives) = self.resource.cache_control(&mut self.ctx)? {
            self.ctx.response.set_header("Cache-Control", directives);
        }
        Ok(())
    }

    /// Hands a PUT or POST body to the resource.
    ///
    /// Answers 415 when the request's media type is not accepted and 500
    /// when the resource reports failure; otherwise `None` and traversal
    /// continues.
    pub(crate) fn accept_helper(&mut self) -> Outcome<Option<Decision>> {
        let raw = self
            .ctx
            .request
            .header("Content-Type")
            .unwrap_or("application/octet-stream")
            .to_string();
        let content_type = MediaType::parse(&raw)
            .ok_or_else(|| FlowError::malformed(format!("invalid Content-Type {raw:?}")))?;

        let accepted = self.resource.content_types_accepted(&mut self.ctx)?;
        let matched = accepted
            .iter()
            .filter_map(|a| MediaType::parse(a))
            .find(|a| a.covers(&content_type) || a.type_matches(&content_type));

        if matched.is_none() {
            return Ok(Some(Decision::Respond(StatusCode::UNSUPPORTED_MEDIA_TYPE.as_u16())));
        }

        if self.resource.accept(&mut self.ctx, &content_type)? {
            Ok(None)
        } else {
            Ok(Some(Decision::Respond(StatusCode::INTERNAL_SERVER_ERROR.as_u16())))
        }
    }

    /// Applies the negotiated content coding to a buffered body.
    pub(crate) fn encode_body(&mut self) -> Outcome<()> {
        let encoding = match self.ctx.metadata.encoding() {
            Some(e) if !e.eq_ignore_ascii_case("identity") => e.to_string(),
            _ => return Ok(()),
        };
        if !matches!(self.ctx.response.body, ResponseBody::Bytes(_)) {
            return Ok(());
        }
        if let ResponseBody::Bytes(bytes) = std::mem::take(&mut self.ctx.response.body) {
            let encoded: Bytes = self.resource.encode_body(&mut self.ctx, &encoding, bytes)?;
            self.ctx.response.body = ResponseBody::Bytes(encoded);
        }
        Ok(())
    }
}
