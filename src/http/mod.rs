//! HTTP model used by the decision engine.
//!
//! The transport that produces requests and writes responses lives outside
//! this crate; these types are what it hands over and gets back.
//!
//! - **`request`**: the inbound request, its method and body, and the
//!   dispatcher's once-only routing data
//! - **`response`**: status codes and the response under construction
//! - **`headers`**: ordered, case-insensitive header multi-map
//! - **`conneg`**: `Accept*` parsing and offer selection
//! - **`etag`**: entity tags and `If-Match` / `If-None-Match` lists
//! - **`date`**: HTTP-date formatting and parsing
//!
//! # Example
//!
//! ```
//! use webmachine::http::request::{Method, RequestBuilder};
//!
//! let request = RequestBuilder::new()
//!     .method(Method::GET)
//!     .uri("http://example.com/widgets/1?view=full")
//!     .header("Accept", "application/json")
//!     .build()
//!     .unwrap();
//!
//! assert!(request.is_get());
//! assert_eq!(request.uri().path(), "/widgets/1");
//! assert_eq!(request.header("accept"), Some("application/json"));
//! ```

pub mod conneg;
pub mod date;
pub mod etag;
pub mod headers;
pub mod request;
pub mod response;
