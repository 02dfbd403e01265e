//! Integration tests for URL resolution.

use lantern_common::{DefaultUrlResolver, UrlError, UrlResolver};
use url::Url;

fn base(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn test_relative_import_joins_base() {
    let resolver = DefaultUrlResolver::new();
    let target = resolver
        .resolve_import_target(Some(&base("http://example.com/css/main.css")), "theme/dark.css")
        .unwrap();
    assert_eq!(target.as_str(), "http://example.com/css/theme/dark.css");
}

#[test]
fn test_parent_and_root_relative_imports() {
    let resolver = DefaultUrlResolver::new();
    let base = base("http://example.com/css/sub/a.css");
    assert_eq!(
        resolver.resolve_import_target(Some(&base), "../b.css").unwrap().as_str(),
        "http://example.com/css/b.css"
    );
    assert_eq!(
        resolver.resolve_import_target(Some(&base), "/c.css").unwrap().as_str(),
        "http://example.com/c.css"
    );
}

#[test]
fn test_absolute_import_ignores_base() {
    let resolver = DefaultUrlResolver::new();
    let target = resolver
        .resolve_import_target(Some(&base("http://example.com/a.css")), " https://cdn.test/x.css ")
        .unwrap();
    assert_eq!(target.as_str(), "https://cdn.test/x.css");
}

#[test]
fn test_relative_import_without_base_fails() {
    let resolver = DefaultUrlResolver::new();
    assert!(matches!(
        resolver.resolve_import_target(None, "a.css"),
        Err(UrlError::MissingBase(href)) if href == "a.css"
    ));
}

#[test]
fn test_base_as_url() {
    let resolver = DefaultUrlResolver::new();
    let url = resolver.resolve_base("http://example.com/index.html").unwrap();
    assert_eq!(url.as_str(), "http://example.com/index.html");
}

#[test]
fn test_base_as_path() {
    let resolver = DefaultUrlResolver::new();
    let url = resolver.resolve_base("styles/site.css").unwrap();
    assert_eq!(url.scheme(), "file");
    assert!(url.path().ends_with("/styles/site.css"));
}

#[test]
fn test_malformed_base_fails() {
    let resolver = DefaultUrlResolver::new();
    assert!(matches!(
        resolver.resolve_base("http://[::1"),
        Err(UrlError::Parse { .. })
    ));
}
