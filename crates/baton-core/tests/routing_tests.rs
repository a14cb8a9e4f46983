use baton_core::prelude::*;
use baton_core::routing::{RouteTable, Target};

fn builder() -> RouterBuilder {
    RouterBuilder::new()
}

#[test]
fn test_widget_scenario() {
    let mut b = builder();
    b.map("GET", "/v1/widgets/[i:id]", "Widgets@show", None).unwrap();

    let m = b.match_route("/v1/widgets/42", "GET").expect("should match");
    assert_eq!(m.param("id"), Some("42"));
    match m.target() {
        Target::Action(action) => {
            assert_eq!(action.controller.as_deref(), Some("Widgets"));
            assert_eq!(action.method, "show");
        }
        other => panic!("unexpected target {other:?}"),
    }

    assert!(b.match_route("/v1/widgets/abc", "GET").is_none());
}

#[test]
fn test_literal_routes_ignore_trailing_slash() {
    let mut b = builder();
    b.get("/about", "Pages@about").unwrap();
    b.get("/", "Pages@home").unwrap();

    assert!(b.match_route("/about", "GET").is_some());
    assert!(b.match_route("/about/", "GET").is_some());
    assert!(b.match_route("//about//", "GET").is_some());
    assert!(b.match_route("/about/us", "GET").is_none());

    let root = b.match_route("/", "GET").unwrap();
    assert_eq!(root.target().to_string(), "Pages@home");
    let root = b.match_route("", "GET").unwrap();
    assert_eq!(root.target().to_string(), "Pages@home");
}

#[test]
fn test_query_string_is_stripped() {
    let mut b = builder();
    b.get("/search", "Search@index").unwrap();
    assert!(b.match_route("/search?q=rust&page=2", "GET").is_some());
}

#[test]
fn test_base_path_is_stripped() {
    let mut b = builder();
    b.set_base_path("/api");
    b.get("/users/[i:id]", "Users@show").unwrap();

    let m = b.match_route("/api/users/7", "GET").unwrap();
    assert_eq!(m.param("id"), Some("7"));
}

#[test]
fn test_registration_order_wins() {
    let mut b = builder();
    b.get("/posts/[*:slug]", "Posts@bySlug").unwrap();
    b.get("/posts/[i:id]", "Posts@show").unwrap();

    let m = b.match_route("/posts/12", "GET").unwrap();
    assert_eq!(m.index(), 0);
    assert_eq!(m.target().to_string(), "Posts@bySlug");
}

#[test]
fn test_method_list_matching() {
    let mut b = builder();
    b.map("get|post", "/form", "Forms@handle", None).unwrap();

    assert!(b.match_route("/form", "GET").is_some());
    assert!(b.match_route("/form", "post").is_some());
    assert!(b.match_route("/form", "DELETE").is_none());
}

#[test]
fn test_any_covers_routable_verbs() {
    let mut b = builder();
    b.any("/ping", "Health@ping").unwrap();

    for method in ["GET", "POST", "PATCH", "PUT", "DELETE", "OPTIONS"] {
        assert!(b.match_route("/ping", method).is_some(), "{method} should match");
    }
    assert!(b.match_route("/ping", "HEAD").is_none());
}

#[test]
fn test_digit_params_are_digits() {
    let mut b = builder();
    b.get("/items/[i:id]", "Items@show").unwrap();

    for path in ["/items/0", "/items/123", "/items/0042"] {
        let m = b.match_route(path, "GET").unwrap();
        assert!(m.param("id").unwrap().chars().all(|c| c.is_ascii_digit()));
    }
    for path in ["/items/12a", "/items/-1", "/items/"] {
        assert!(b.match_route(path, "GET").is_none(), "{path} should not match");
    }
}

#[test]
fn test_wildcard_and_raw_regex() {
    let mut b = builder();
    b.get("@^/legacy/(?P<page>\\w+)\\.php$", "Legacy@page").unwrap();
    b.get("*", "Fallback@any").unwrap();

    let m = b.match_route("/legacy/index.php", "GET").unwrap();
    assert_eq!(m.param("page"), Some("index"));

    let m = b.match_route("/anything/else", "GET").unwrap();
    assert_eq!(m.target().to_string(), "Fallback@any");
    assert!(m.params().is_empty());
}

#[test]
fn test_custom_match_types_override() {
    let mut b = builder();
    b.add_match_types([("i", "[0-9]{2}")]);
    b.get("/codes/[i:code]", "Codes@show").unwrap();

    assert!(b.match_route("/codes/42", "GET").is_some());
    assert!(b.match_route("/codes/421", "GET").is_none());
}

#[test]
fn test_matching_is_idempotent() {
    let mut b = builder();
    b.get("/v1/widgets/[i:id]/[:slug]?", "Widgets@show").unwrap();

    let first = b.match_route("/v1/widgets/42/blue", "GET").unwrap();
    let second = b.match_route("/v1/widgets/42/blue", "GET").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.params().len(), 2);
}

#[test]
fn test_duplicate_route_name() {
    let mut b = builder();
    b.map("GET", "/a", "A@a", Some("home")).unwrap();
    let err = b.map("GET", "/b", "B@b", Some("home")).map(|_| ()).unwrap_err();

    assert!(matches!(err, BatonError::DuplicateRouteName(ref name) if name == "home"));
    assert_eq!(err.to_string(), "Can not redeclare route 'home'");
}

#[test]
fn test_add_routes_bulk() {
    let mut b = builder();
    b.add_routes(vec![
        ("GET", "/a".to_string(), "A@a", Some("a".to_string())),
        ("POST", "/b".to_string(), "B@b", None),
    ])
    .unwrap();

    assert_eq!(b.table().len(), 2);
    assert_eq!(b.table().named("a").unwrap().pattern(), "/a");
}

#[test]
fn test_url_for() {
    let mut b = builder();
    b.set_base_path("/api");
    b.get("/posts/[i:id]/[:slug]?", Endpoint::new("Posts@show").named("post")).unwrap();

    let params: Params = [("id", "5"), ("slug", "hello")].into_iter().collect();
    assert_eq!(b.table().url_for("post", &params).unwrap(), "/api/posts/5/hello");

    let params: Params = [("id", "5")].into_iter().collect();
    assert_eq!(b.table().url_for("post", &params).unwrap(), "/api/posts/5");

    assert!(b.table().url_for("missing", &params).is_err());
}

#[test]
fn test_url_for_with_trailing_slash_base() {
    let mut b = builder();
    b.set_base_path("/api/");
    b.get("/p/[i:id]", Endpoint::new("P@show").named("p")).unwrap();

    let params: Params = [("id", "1")].into_iter().collect();
    assert_eq!(b.table().url_for("p", &params).unwrap(), "/api/p/1");
    assert!(b.match_route("/api/p/1", "GET").is_some());
}

#[test]
fn test_route_table_direct_use() {
    let mut table = RouteTable::with_base_path("/svc");
    table
        .add_route(baton_core::routing::Route::new("GET", "/health", "Health@check"))
        .unwrap();

    assert!(table.match_route("/svc/health?verbose=1", "GET").is_some());
    assert!(table.match_route("/svc/health", "POST").is_none());
}
