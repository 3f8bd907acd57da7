use chrono::{DateTime, Utc};

use crate::http::conneg::MediaType;
use crate::http::etag::ETag;

/// What a traversal has negotiated and computed so far.
///
/// One instance lives for one traversal. Each negotiated field is written by
/// a single node; validators are memoized the first time a node needs them
/// so the resource is asked at most once.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Written by C3/C4.
    content_type: Option<MediaType>,
    /// Written by D4/D5.
    language: Option<String>,
    /// Written by E5/E6.
    charset: Option<String>,
    /// Written by F6/F7.
    encoding: Option<String>,
    etag: Option<Option<ETag>>,
    last_modified: Option<Option<DateTime<Utc>>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// The negotiated media type, if any was offered.
    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// The resource's ETag, once computed.
    pub fn etag(&self) -> Option<&ETag> {
        self.etag.as_ref().and_then(Option::as_ref)
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified.flatten()
    }

    pub(crate) fn set_content_type(&mut self, media_type: MediaType) {
        self.content_type = Some(media_type);
    }

    pub(crate) fn set_language(&mut self, language: String) {
        self.language = Some(language);
    }

    pub(crate) fn set_charset(&mut self, charset: String) {
        self.charset = Some(charset);
    }

    pub(crate) fn set_encoding(&mut self, encoding: String) {
        self.encoding = Some(encoding);
    }

    pub(crate) fn cached_etag(&self) -> Option<Option<ETag>> {
        self.etag.clone()
    }

    pub(crate) fn cache_etag(&mut self, etag: Option<ETag>) {
        self.etag = Some(etag);
    }

    pub(crate) fn cached_last_modified(&self) -> Option<Option<DateTime<Utc>>> {
        self.last_modified
    }

    pub(crate) fn cache_last_modified(&mut self, last_modified: Option<DateTime<Utc>>) {
        self.last_modified = Some(last_modified);
    }
}
