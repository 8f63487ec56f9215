use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use card_axum::CsrfGuard;
use card_core::CardService;
use contactcard::services::{Contact, ContactParams};
use contactcard::sync::StaticProbe;
use contactcard::{build_with, contact_app, Backend};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-secret";
const ROSE: &str = "0031U00001WaiGcQAJ";
const SEAN: &str = "0031U00001WaiGdQAJ";

fn router_with(backend: Backend, force_https: bool) -> Router {
    let force_https = force_https.to_string();
    let app = contact_app(move |key| match key {
        "DATABASE_URL" => Some("memory://".to_string()),
        "SECRET_KEY" => Some(SECRET.to_string()),
        "FORCE_HTTPS" => Some(force_https.clone()),
        _ => None,
    })
    .unwrap();
    build_with(app, backend).unwrap().into_router()
}

fn router() -> Router {
    router_with(Backend::memory(), false)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

fn patch_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn form_body(sfid: &str, fields: &str) -> String {
    let token = CsrfGuard::new(SECRET).unwrap().token(sfid);
    format!("{fields}&csrf_token={token}")
}

async fn text_body(res: Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(res: &Response) -> &str {
    res.headers().get("location").unwrap().to_str().unwrap()
}

/// `name=value` of the flash cookie a response set.
fn flash_cookie(res: &Response) -> String {
    let raw = res.headers().get("set-cookie").unwrap().to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn all_contacts(router: &Router) -> Value {
    let res = router.clone().oneshot(get("/api/contacts")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    json_body(res).await
}

#[tokio::test]
async fn health_ok() {
    let res = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(text_body(res).await, "ok");
}

#[tokio::test]
async fn index_lists_every_contact() {
    let res = router().oneshot(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-request-id").is_some());

    let html = text_body(res).await;
    for name in ["Rose Gonzalez", "Sean Forbes", "Jack Rogers", "Pat Stumuller", "Andy Young"] {
        assert!(html.contains(name), "missing {name}");
    }
    assert!(html.contains(&format!("href=\"/contact/{ROSE}\"")));
}

#[tokio::test]
async fn api_lists_all_rows_in_id_order() {
    let contacts = all_contacts(&router()).await;
    let ids: Vec<i64> = contacts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn api_patch_persists_exactly_the_mutable_fields() {
    let router = router();
    let before = all_contacts(&router).await;

    let res = router
        .clone()
        .oneshot(patch_json(
            &format!("/api/contacts/{ROSE}"),
            json!({
                "firstname": "  Rosa ",
                "lastname": "Gonzales",
                "title": "",
                "email": "rosa@edge.com",
                "phone": "(512) 757-6001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let expected = json!({
        "id": 1,
        "sfid": ROSE,
        "firstname": "Rosa",
        "lastname": "Gonzales",
        "title": null,
        "email": "rosa@edge.com",
        "phone": "(512) 757-6001"
    });
    assert_eq!(json_body(res).await, expected);

    let after = all_contacts(&router).await;
    assert_eq!(after[0], expected);
    assert_eq!(after.as_array().unwrap()[1..], before.as_array().unwrap()[1..]);
}

#[tokio::test]
async fn api_patch_cannot_write_sfid() {
    let router = router();
    let before = all_contacts(&router).await;

    let res = router
        .clone()
        .oneshot(patch_json(
            &format!("/api/contacts/{ROSE}"),
            json!({
                "sfid": "003000000000000AAA",
                "firstname": "Rose",
                "lastname": "Gonzalez",
                "email": "rose@edge.com",
                "phone": "1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(all_contacts(&router).await, before);
}

#[tokio::test]
async fn api_patch_of_unknown_sfid_is_404_and_harmless() {
    let router = router();
    let before = all_contacts(&router).await;

    let res = router
        .clone()
        .oneshot(patch_json(
            "/api/contacts/003000000000000AAA",
            json!({
                "firstname": "Nobody",
                "lastname": "Here",
                "email": "nobody@example.com",
                "phone": "0"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = json_body(res).await;
    assert_eq!(body["name"], "NotFound");
    assert_eq!(body["message"], "No contact with matching Salesforce ID exists.");

    assert_eq!(all_contacts(&router).await, before);
}

#[tokio::test]
async fn api_patch_validates_like_the_form() {
    let res = router()
        .oneshot(patch_json(
            &format!("/api/contacts/{SEAN}"),
            json!({
                "firstname": "Sean",
                "lastname": " ",
                "email": "sean-at-edge",
                "phone": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert_eq!(body["className"], "unprocessable");
    assert_eq!(
        body["errors"],
        json!({
            "email": ["Invalid email address."],
            "lastname": ["This field is required."]
        })
    );
}

#[tokio::test]
async fn api_invalid_patch_of_unknown_sfid_is_404() {
    let router = router();
    let before = all_contacts(&router).await;

    let res = router
        .clone()
        .oneshot(patch_json(
            "/api/contacts/003000000000000AAA",
            json!({
                "firstname": "",
                "lastname": "Here",
                "email": "bad",
                "phone": "0"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["name"], "NotFound");

    assert_eq!(all_contacts(&router).await, before);
}

#[tokio::test]
async fn api_is_unavailable_until_heroku_connect_syncs() {
    let probe = Arc::new(StaticProbe::new(false));
    let backend = Backend {
        probe: probe.clone(),
        ..Backend::memory()
    };
    let router = router_with(backend, false);

    let res = router.clone().oneshot(get("/api/contacts")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Unavailable");
    assert_eq!(
        body["message"],
        "Heroku Connect has not created the contact table yet."
    );

    let res = router
        .clone()
        .oneshot(patch_json(
            &format!("/api/contacts/{ROSE}"),
            json!({
                "firstname": "Rose",
                "lastname": "Gonzalez",
                "email": "rose@edge.com",
                "phone": "1"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    probe.set_ready(true);
    assert_eq!(all_contacts(&router).await.as_array().unwrap().len(), 5);
    assert_eq!(all_contacts(&router).await[0]["phone"], "(512) 757-6000");
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let res = router()
        .oneshot(get(&format!("/contact/{SEAN}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let html = text_body(res).await;
    assert!(html.contains("value=\"Sean\""));
    assert!(html.contains("value=\"sean@edge.com\""));
    let token = CsrfGuard::new(SECRET).unwrap().token(SEAN);
    assert!(html.contains(&format!("value=\"{token}\"")));
}

#[tokio::test]
async fn saving_redirects_and_flashes_once() {
    let router = router();

    let res = router
        .clone()
        .oneshot(post_form(
            &format!("/contact/{SEAN}"),
            form_body(
                SEAN,
                "firstname=Sean&lastname=Forbes&title=CEO&email=sean%40edge.com&phone=555-0100",
            ),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/contact/{SEAN}"));
    let cookie = flash_cookie(&res);

    let res = router
        .clone()
        .oneshot(get_with_cookie(&format!("/contact/{SEAN}"), &cookie))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
    let html = text_body(res).await;
    assert!(html.contains("Contact successfully updated."));
    assert!(html.contains("value=\"CEO\""));

    let res = router
        .clone()
        .oneshot(get(&format!("/contact/{SEAN}")))
        .await
        .unwrap();
    assert!(!text_body(res).await.contains("Contact successfully updated."));

    let contacts = all_contacts(&router).await;
    assert_eq!(contacts[1]["sfid"], SEAN);
    assert_eq!(contacts[1]["title"], "CEO");
    assert_eq!(contacts[1]["phone"], "555-0100");
}

#[tokio::test]
async fn invalid_form_is_rerendered_with_422() {
    let router = router();
    let before = all_contacts(&router).await;

    let res = router
        .clone()
        .oneshot(post_form(
            &format!("/contact/{SEAN}"),
            form_body(SEAN, "firstname=&lastname=Forbes&title=&email=nope&phone=1"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = text_body(res).await;
    assert!(html.contains("alert alert-danger"));
    assert!(html.contains("This field is required."));
    assert!(html.contains("Invalid email address."));
    assert!(html.contains("value=\"nope\""));

    assert_eq!(all_contacts(&router).await, before);
}

#[tokio::test]
async fn bad_csrf_token_is_forbidden() {
    let router = router();
    let before = all_contacts(&router).await;

    let stolen = CsrfGuard::new(SECRET).unwrap().token(ROSE);
    let res = router
        .clone()
        .oneshot(post_form(
            &format!("/contact/{SEAN}"),
            format!("firstname=X&lastname=Y&email=x%40y.com&phone=1&csrf_token={stolen}"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    assert_eq!(all_contacts(&router).await, before);
}

#[tokio::test]
async fn unknown_contact_flashes_and_goes_home() {
    let router = router();

    let res = router
        .clone()
        .oneshot(get("/contact/003000000000000AAA"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = flash_cookie(&res);

    let res = router.oneshot(get_with_cookie("/", &cookie)).await.unwrap();
    let html = text_body(res).await;
    assert!(html.contains("alert alert-danger"));
    assert!(html.contains("No contact with matching Salesforce ID exists."));
}

#[tokio::test]
async fn posting_to_unknown_contact_goes_home() {
    let sfid = "003000000000000AAA";
    let res = router()
        .oneshot(post_form(
            &format!("/contact/{sfid}"),
            form_body(sfid, "firstname=A&lastname=B&email=a%40b.com&phone=1"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
}

#[tokio::test]
async fn invalid_post_to_unknown_contact_goes_home() {
    let sfid = "003000000000000AAA";
    let router = router();

    let res = router
        .clone()
        .oneshot(post_form(
            &format!("/contact/{sfid}"),
            form_body(sfid, "firstname=&lastname=B&email=bad&phone=1"),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let cookie = flash_cookie(&res);

    let res = router.oneshot(get_with_cookie("/", &cookie)).await.unwrap();
    let html = text_body(res).await;
    assert!(html.contains("No contact with matching Salesforce ID exists."));
    assert!(!html.contains("Invalid email address."));
}

#[tokio::test]
async fn pages_wait_for_heroku_connect() {
    let probe = Arc::new(StaticProbe::new(false));
    let backend = Backend {
        probe: probe.clone(),
        ..Backend::memory()
    };
    let router = router_with(backend, false);

    for uri in ["/", "/contact/0031U00001WaiGcQAJ"] {
        let res = router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&res), "/welcome");
    }

    let res = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/welcome")
                .header("host", "contact-card.herokuapp.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(text_body(res)
        .await
        .contains("https://dashboard.heroku.com/apps/contact-card/resources"));

    probe.set_ready(true);
    let res = router.clone().oneshot(get("/welcome")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = router.oneshot(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn plain_http_is_sent_to_https() {
    let res = router_with(Backend::memory(), true)
        .oneshot(
            Request::builder()
                .uri("/contact/0031U00001WaiGcQAJ")
                .header("host", "contact-card.herokuapp.com")
                .header("x-forwarded-proto", "http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        location(&res),
        "https://contact-card.herokuapp.com/contact/0031U00001WaiGcQAJ"
    );
}

struct DatabaseDown;

#[async_trait::async_trait]
impl CardService<Contact, ContactParams> for DatabaseDown {
    async fn find(&self, _params: ContactParams) -> anyhow::Result<Vec<Contact>> {
        Err(anyhow::anyhow!("connection refused: postgres://admin:hunter2@db"))
    }
}

#[tokio::test]
async fn database_failures_show_a_generic_page() {
    let backend = Backend {
        store: Arc::new(DatabaseDown),
        ..Backend::memory()
    };
    let res = router_with(backend, false).oneshot(get("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = text_body(res).await;
    assert!(html.contains("500 Internal Server Error"));
    assert!(!html.contains("hunter2"));
}
