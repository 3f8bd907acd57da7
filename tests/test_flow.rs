mod common;

use common::{Configurable, body_str, get, request, run};
use webmachine::Authorization;
use webmachine::http::request::Method;

fn put_json(path: &str, body: &'static str) -> webmachine::http::request::RequestBuilder {
    request(Method::PUT, path)
        .header("Content-Type", "application/json")
        .body(body)
}

fn post_json(path: &str, body: &'static str) -> webmachine::http::request::RequestBuilder {
    request(Method::POST, path)
        .header("Content-Type", "application/json")
        .body(body)
}

#[test]
fn test_unknown_method_answers_501() {
    let mut resource = Configurable::default();
    let req = request(Method::Extension("PATCH".to_string()), "/").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(501));
}

#[test]
fn test_disallowed_method_answers_405_with_allow() {
    let mut resource = Configurable {
        allowed: vec![Method::GET, Method::HEAD],
        ..Default::default()
    };
    let response = run(&mut resource, request(Method::DELETE, "/").build().unwrap());

    assert_eq!(response.status_u16(), Some(405));
    assert_eq!(response.header("Allow"), Some("GET, HEAD"));
}

#[test]
fn test_uri_too_long_answers_414() {
    let mut resource = Configurable {
        uri_too_long: true,
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.status_u16(), Some(414));
}

#[test]
fn test_content_md5_mismatch_answers_400() {
    let mut resource = Configurable {
        checksum: Some(false),
        ..Default::default()
    };
    let req = put_json("/", "{}").header("Content-MD5", "bogus").build().unwrap();
    let response = run(&mut resource, req);

    assert_eq!(response.status_u16(), Some(400));
    assert!(body_str(&response).contains("Content-MD5"));
}

#[test]
fn test_content_md5_ignored_without_header() {
    let mut resource = Configurable {
        checksum: Some(false),
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.status_u16(), Some(200));
}

#[test]
fn test_unauthorized_without_challenge() {
    let mut resource = Configurable {
        authorization: Authorization::Denied,
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());

    assert_eq!(response.status_u16(), Some(401));
    assert_eq!(response.header("WWW-Authenticate"), None);
}

#[test]
fn test_unauthorized_with_challenge() {
    let mut resource = Configurable {
        authorization: Authorization::Challenge("Basic realm=\"widgets\"".to_string()),
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());

    assert_eq!(response.status_u16(), Some(401));
    assert_eq!(response.header("WWW-Authenticate"), Some("Basic realm=\"widgets\""));
}

#[test]
fn test_forbidden_answers_403() {
    let mut resource = Configurable {
        forbidden: true,
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.status_u16(), Some(403));
}

#[test]
fn test_request_validation_statuses() {
    let cases: Vec<(Configurable, u16)> = vec![
        (
            Configurable {
                valid_content_headers: false,
                ..Default::default()
            },
            501,
        ),
        (
            Configurable {
                known_content_type: false,
                ..Default::default()
            },
            415,
        ),
        (
            Configurable {
                valid_entity_length: false,
                ..Default::default()
            },
            413,
        ),
    ];

    for (mut resource, expected) in cases {
        let response = run(&mut resource, put_json("/", "{}").build().unwrap());
        assert_eq!(response.status_u16(), Some(expected));
    }
}

#[test]
fn test_options_answers_200_with_resource_headers() {
    let mut resource = Configurable {
        allowed: vec![Method::GET, Method::OPTIONS],
        options: vec![("Allow".to_string(), "GET, OPTIONS".to_string())],
        ..Default::default()
    };
    let response = run(&mut resource, request(Method::OPTIONS, "/").build().unwrap());

    assert_eq!(response.status_u16(), Some(200));
    assert_eq!(response.header("Allow"), Some("GET, OPTIONS"));
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[test]
fn test_unacceptable_media_type_answers_406() {
    let mut resource = Configurable::default();
    let req = get("/").header("Accept", "application/json").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(406));
}

#[test]
fn test_accept_selects_media_type_and_sets_vary() {
    let mut resource = Configurable {
        provided: vec!["text/plain".to_string(), "application/json".to_string()],
        ..Default::default()
    };
    let req = get("/")
        .header("Accept", "application/json, text/plain;q=0.5")
        .build()
        .unwrap();
    let response = run(&mut resource, req);

    assert_eq!(response.status_u16(), Some(200));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(body_str(&response), "hello as application/json");
    assert_eq!(response.header("Vary"), Some("Accept"));
}

#[test]
fn test_accept_headers_split_across_lines() {
    let mut resource = Configurable {
        provided: vec!["application/json".to_string()],
        languages: vec!["en".to_string(), "de".to_string()],
        encodings: vec!["reverse".to_string(), "identity".to_string()],
        body: "abc".to_string(),
        ..Default::default()
    };
    let req = get("/")
        .header("Accept", "text/html")
        .header("Accept", "application/json")
        .header("Accept-Language", "fr")
        .header("Accept-Language", "de")
        .header("Accept-Encoding", "identity;q=0")
        .header("Accept-Encoding", "reverse")
        .build()
        .unwrap();
    let response = run(&mut resource, req);

    assert_eq!(response.status_u16(), Some(200));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.header("Content-Language"), Some("de"));
    assert_eq!(response.header("Content-Encoding"), Some("reverse"));
}

#[test]
fn test_malformed_resource_answers_400_page() {
    let mut resource = Configurable {
        malformed: true,
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());

    assert_eq!(response.status_u16(), Some(400));
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert!(body_str(&response).contains("Bad Request"));
    assert!(body_str(&response).contains("could not be understood"));
}

#[test]
fn test_unparsable_content_length_answers_400() {
    let mut resource = Configurable::default();
    let req = put_json("/", "{}").header("Content-Length", "two").build().unwrap();
    let response = run(&mut resource, req);

    assert_eq!(response.status_u16(), Some(400));
    assert!(body_str(&response).contains("Content-Length header is not a valid length."));
    assert!(resource.accepted_bodies.is_empty());

    let req = put_json("/", "{}").header("Content-Length", "2").build().unwrap();
    assert_eq!(run(&mut resource, req).status_u16(), Some(204));
}

#[test]
fn test_language_negotiation() {
    let mut resource = Configurable {
        languages: vec!["en".to_string(), "de".to_string()],
        ..Default::default()
    };

    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.header("Content-Language"), Some("en"));

    let req = get("/").header("Accept-Language", "de-DE, de;q=0.9").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.header("Content-Language"), Some("de"));
    assert_eq!(response.header("Vary"), Some("Accept-Language"));

    let req = get("/").header("Accept-Language", "fr").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(406));
}

#[test]
fn test_charset_negotiation() {
    let mut resource = Configurable {
        charsets: vec!["utf-8".to_string()],
        ..Default::default()
    };

    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));

    let req = get("/").header("Accept-Charset", "koi8-r").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(406));
}

#[test]
fn test_encoding_negotiation() {
    let mut resource = Configurable {
        encodings: vec!["reverse".to_string(), "identity".to_string()],
        body: "abc".to_string(),
        provided: vec!["text/x-a".to_string()],
        ..Default::default()
    };

    let req = get("/").header("Accept-Encoding", "reverse").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(200));
    assert_eq!(response.header("Content-Encoding"), Some("reverse"));
    assert_eq!(body_str(&response), "a-x/txet sa cba");
    assert_eq!(response.header("Vary"), Some("Accept-Encoding"));

    // identity needs no Content-Encoding header
    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.header("Content-Encoding"), None);
    assert_eq!(body_str(&response), "abc as text/x-a");
}

#[test]
fn test_refused_identity_answers_406() {
    let mut resource = Configurable::default();
    let req = get("/").header("Accept-Encoding", "identity;q=0").build().unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(406));
}

#[test]
fn test_put_to_missing_resource_creates_it() {
    let mut resource = Configurable {
        exists: false,
        ..Default::default()
    };
    let response = run(&mut resource, put_json("/widgets/1", "{\"a\":1}").build().unwrap());

    assert_eq!(response.status_u16(), Some(204));
    assert_eq!(response.header("Content-Length"), Some("0"));
    assert_eq!(resource.accepted_bodies.len(), 1);
    assert_eq!(resource.accepted_bodies[0].0, "application/json");
    assert_eq!(resource.accepted_bodies[0].1.as_ref(), b"{\"a\":1}");
}

#[test]
fn test_put_to_moved_resource_answers_301() {
    let mut resource = Configurable {
        exists: false,
        moved_permanently: Some("http://example.com/new".to_string()),
        ..Default::default()
    };
    let response = run(&mut resource, put_json("/old", "{}").build().unwrap());

    assert_eq!(response.status_u16(), Some(301));
    assert_eq!(response.header("Location"), Some("http://example.com/new"));
    assert!(resource.accepted_bodies.is_empty());
}

#[test]
fn test_put_to_existing_resource() {
    let mut resource = Configurable::default();
    let response = run(&mut resource, put_json("/widgets/1", "{}").build().unwrap());
    assert_eq!(response.status_u16(), Some(204));
    assert_eq!(resource.accepted_bodies.len(), 1);
}

#[test]
fn test_put_statuses() {
    let conflict = Configurable {
        conflict: true,
        ..Default::default()
    };
    let refused = Configurable {
        accept_ok: false,
        ..Default::default()
    };
    for (mut resource, expected) in [(conflict, 409), (refused, 500)] {
        let response = run(&mut resource, put_json("/", "{}").build().unwrap());
        assert_eq!(response.status_u16(), Some(expected));
    }

    let mut resource = Configurable::default();
    let req = request(Method::PUT, "/")
        .header("Content-Type", "text/csv")
        .body("a,b")
        .build()
        .unwrap();
    assert_eq!(run(&mut resource, req).status_u16(), Some(415));

    // no Content-Type means application/octet-stream
    let req = request(Method::PUT, "/").body("raw").build().unwrap();
    assert_eq!(run(&mut resource, req).status_u16(), Some(415));

    let req = request(Method::PUT, "/")
        .header("Content-Type", "garbage")
        .body("x")
        .build()
        .unwrap();
    let response = run(&mut resource, req);
    assert_eq!(response.status_u16(), Some(400));
    assert!(body_str(&response).contains("garbage"));
}

#[test]
fn test_missing_resource_branches() {
    let cases: Vec<(Configurable, Method, u16)> = vec![
        (
            Configurable {
                exists: false,
                previously_existed: true,
                moved_permanently: Some("http://example.com/p".to_string()),
                ..Default::default()
            },
            Method::GET,
            301,
        ),
        (
            Configurable {
                exists: false,
                previously_existed: true,
                moved_temporarily: Some("http://example.com/t".to_string()),
                ..Default::default()
            },
            Method::GET,
            307,
        ),
        (
            Configurable {
                exists: false,
                previously_existed: true,
                ..Default::default()
            },
            Method::GET,
            410,
        ),
        (
            Configurable {
                exists: false,
                previously_existed: true,
                ..Default::default()
            },
            Method::POST,
            410,
        ),
        (
            Configurable {
                exists: false,
                ..Default::default()
            },
            Method::POST,
            404,
        ),
        (
            Configurable {
                exists: false,
                previously_existed: true,
                allow_missing_post: true,
                ..Default::default()
            },
            Method::POST,
            204,
        ),
        (
            Configurable {
                exists: false,
                allow_missing_post: true,
                ..Default::default()
            },
            Method::POST,
            204,
        ),
    ];

    for (mut resource, method, expected) in cases {
        let req = request(method.clone(), "/gone")
            .header("Content-Type", "application/json")
            .body("{}")
            .build()
            .unwrap();
        let response = run(&mut resource, req);
        assert_eq!(response.status_u16(), Some(expected), "{method} expected {expected}");
    }
}

#[test]
fn test_temporary_redirect_sets_location() {
    let mut resource = Configurable {
        exists: false,
        previously_existed: true,
        moved_temporarily: Some("http://example.com/t".to_string()),
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());
    assert_eq!(response.header("Location"), Some("http://example.com/t"));
}

#[test]
fn test_post_create_answers_201_with_location() {
    let mut resource = Configurable {
        post_is_create: true,
        create_path: Some("widgets/42".to_string()),
        ..Default::default()
    };
    let response = run(&mut resource, post_json("/widgets", "{\"n\":42}").build().unwrap());

    assert_eq!(response.status_u16(), Some(201));
    assert_eq!(response.header("Location"), Some("http://example.com/widgets/42"));
    assert_eq!(resource.accepted_bodies.len(), 1);
}

#[test]
fn test_post_create_uses_request_base_uri() {
    let mut resource = Configurable {
        post_is_create: true,
        create_path: Some("items/1".to_string()),
        ..Default::default()
    };
    let req = post_json("/api/items", "{}")
        .base_uri("http://example.com/api/")
        .build()
        .unwrap();
    let response = run(&mut resource, req);

    assert_eq!(response.status_u16(), Some(201));
    assert_eq!(response.header("Location"), Some("http://example.com/api/items/1"));
}

#[test]
fn test_post_create_without_path_answers_500() {
    let mut resource = Configurable {
        post_is_create: true,
        ..Default::default()
    };
    let response = run(&mut resource, post_json("/widgets", "{}").build().unwrap());

    assert_eq!(response.status_u16(), Some(500));
    assert_eq!(resource.handled_exceptions.len(), 1);
    assert!(resource.handled_exceptions[0].contains("create_path"));
}

#[test]
fn test_post_create_redirect_answers_303() {
    let mut resource = Configurable {
        post_is_create: true,
        create_path: Some("/widgets/9".to_string()),
        redirect_after_post: true,
        ..Default::default()
    };
    let response = run(&mut resource, post_json("/widgets", "{}").build().unwrap());

    assert_eq!(response.status_u16(), Some(303));
    assert_eq!(response.header("Location"), Some("http://example.com/widgets/9"));
}

#[test]
fn test_process_post() {
    let mut resource = Configurable::default();
    let response = run(&mut resource, post_json("/rpc", "{}").build().unwrap());
    assert_eq!(response.status_u16(), Some(204));

    let mut resource = Configurable {
        process_post: false,
        ..Default::default()
    };
    let response = run(&mut resource, post_json("/rpc", "{}").build().unwrap());
    assert_eq!(response.status_u16(), Some(500));
}

#[test]
fn test_redirect_without_location_answers_500() {
    let mut resource = Configurable {
        redirect_after_post: true,
        ..Default::default()
    };
    let response = run(&mut resource, post_json("/rpc", "{}").build().unwrap());

    assert_eq!(response.status_u16(), Some(500));
    assert!(resource.handled_exceptions[0].contains("Location"));
}

#[test]
fn test_delete_statuses() {
    let done = Configurable::default();
    let pending = Configurable {
        delete_completed: false,
        ..Default::default()
    };
    let failed = Configurable {
        delete_ok: false,
        ..Default::default()
    };

    for (mut resource, expected) in [(done, 204), (pending, 202), (failed, 500)] {
        let response = run(&mut resource, request(Method::DELETE, "/widgets/1").build().unwrap());
        assert_eq!(response.status_u16(), Some(expected));
        assert_eq!(response.header("Content-Length"), Some("0"));
    }
}

#[test]
fn test_multiple_choices_answers_300() {
    let mut resource = Configurable {
        multiple_choices: true,
        ..Default::default()
    };
    let response = run(&mut resource, get("/").build().unwrap());

    assert_eq!(response.status_u16(), Some(300));
    assert_eq!(body_str(&response), "hello as text/plain");
}

#[test]
fn test_head_gets_get_headers() {
    let mut resource = Configurable {
        etag: Some("v7".to_string()),
        cache_control: Some("no-cache".to_string()),
        ..Default::default()
    };
    let response = run(&mut resource, request(Method::HEAD, "/").build().unwrap());

    assert_eq!(response.status_u16(), Some(200));
    assert_eq!(response.header("ETag"), Some("\"v7\""));
    assert_eq!(response.header("Cache-Control"), Some("no-cache"));
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}
