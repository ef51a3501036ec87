//! Tests for the consultation pages.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;

use super::*;
use crate::domain::ports::ConsultationRepository;
use crate::inbound::http::test_utils::{
    error_fields, form_post, json_body, location, page_get, page_service, session_cookie,
    signed_up,
};
use crate::test_support::InMemoryApp;

async fn only_open_id(app: &InMemoryApp) -> String {
    let open = app.consultations.list_open().await.expect("list open");
    assert_eq!(open.len(), 1);
    open[0].consultation.id.to_string()
}

#[rstest]
#[case("")]
#[case("   ")]
#[actix_web::test]
async fn blank_request_is_rejected_and_not_stored(#[case] body: &str) {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;

    let res = actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", body)], Some(&alice)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = json_body(res).await;
    assert_eq!(error_fields(&error), vec!["body"]);
    assert!(app.consultations.list_open().await.expect("list").is_empty());
}

#[actix_web::test]
async fn over_long_request_is_rejected() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let body = "x".repeat(crate::domain::TEXT_MAX + 1);

    let res = actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", &body)], Some(&alice)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn submitted_request_redirects_home_with_flash() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;

    let res = actix_test::call_service(
        &service,
        form_post(
            "/consultation_request",
            &[("body", "persistent headache")],
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), HOME_PATH);
    let cookie = session_cookie(&res).expect("flash cookie");

    let home = actix_test::call_service(&service, page_get("/index", Some(&cookie))).await;
    let page = json_body(home).await;
    assert_eq!(page["flashes"][0]["message"], SUBMITTED_MESSAGE);
    assert_eq!(page["content"]["links"][0], "/consultation_request");

    let open = app.consultations.list_open().await.expect("list");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].consultation.body.as_ref(), "persistent headache");
    assert_eq!(open[0].requester_username.as_ref(), "alice");
}

#[actix_web::test]
async fn submission_form_needs_login() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;

    let res = actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "help")], None),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login?next=%2Fconsultation_request");
    assert!(app.consultations.list_open().await.expect("list").is_empty());
}

#[actix_web::test]
async fn doctors_see_the_queue_and_others_go_home() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let bob = signed_up(&service, "bob", "doctor").await;
    actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "need help")], Some(&alice)),
    )
    .await;

    let res = actix_test::call_service(&service, page_get("/consultations", Some(&bob))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = json_body(res).await;
    assert_eq!(page["title"], "Consultations");
    assert_eq!(page["content"][0]["body"], "need help");
    assert_eq!(page["content"][0]["requesterUsername"], "alice");

    let res = actix_test::call_service(&service, page_get("/consultations", Some(&alice))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), HOME_PATH);
}

#[actix_web::test]
async fn doctor_claims_on_first_view_and_second_doctor_is_refused() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let bob = signed_up(&service, "bob", "doctor").await;
    let dave = signed_up(&service, "dave", "doctor").await;
    actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "need help")], Some(&alice)),
    )
    .await;
    let id = only_open_id(&app).await;
    let chat_uri = format!("/chat/{id}");

    let res = actix_test::call_service(&service, page_get(&chat_uri, Some(&bob))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = json_body(res).await;
    assert_eq!(page["content"]["claimed"], true);
    assert_eq!(page["content"]["responder"]["username"], "bob");
    assert!(app.consultations.list_open().await.expect("list").is_empty());

    let res = actix_test::call_service(&service, page_get(&chat_uri, Some(&dave))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = actix_test::call_service(&service, page_get(&chat_uri, Some(&alice))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = json_body(res).await;
    assert_eq!(page["content"]["claimed"], false);
    assert_eq!(page["content"]["requester"]["username"], "alice");
}

#[rstest]
#[case("not-a-uuid")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[actix_web::test]
async fn unknown_chat_is_not_found(#[case] id: &str) {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let bob = signed_up(&service, "bob", "doctor").await;

    let res = actix_test::call_service(&service, page_get(&format!("/chat/{id}"), Some(&bob))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error = json_body(res).await;
    assert_eq!(error["code"], "not_found");
}

#[actix_web::test]
async fn doctor_response_is_stored_and_shown() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let bob = signed_up(&service, "bob", "doctor").await;
    actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "need help")], Some(&alice)),
    )
    .await;
    let id = only_open_id(&app).await;
    let chat_uri = format!("/chat/{id}");
    actix_test::call_service(&service, page_get(&chat_uri, Some(&bob))).await;

    let res = actix_test::call_service(
        &service,
        form_post(&chat_uri, &[("response", "see a specialist")], Some(&bob)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), chat_uri);

    let res = actix_test::call_service(&service, page_get(&chat_uri, Some(&alice))).await;
    let page = json_body(res).await;
    assert_eq!(page["content"]["consultation"]["response"], "see a specialist");
    assert_eq!(page["content"]["messages"][0]["body"], "see a specialist");

    let res = actix_test::call_service(&service, page_get("/profile", Some(&alice))).await;
    let profile = json_body(res).await;
    assert_eq!(
        profile["content"]["consultations"][0]["response"],
        "see a specialist"
    );
}

#[actix_web::test]
async fn blank_response_is_rejected_but_the_claim_stays() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let bob = signed_up(&service, "bob", "doctor").await;
    actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "need help")], Some(&alice)),
    )
    .await;
    let id = only_open_id(&app).await;

    let res = actix_test::call_service(
        &service,
        form_post(&format!("/chat/{id}"), &[("response", "  ")], Some(&bob)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error = json_body(res).await;
    assert_eq!(error_fields(&error), vec!["response"]);

    assert!(app.consultations.list_open().await.expect("list").is_empty());
    let consultation_id = crate::domain::ConsultationId::new(&id).expect("id");
    let stored = app
        .consultations
        .find_by_id(&consultation_id)
        .await
        .expect("find")
        .expect("stored");
    assert!(stored.response.is_none());
    assert!(stored.responder_id.is_some());
}

#[actix_web::test]
async fn outsider_cannot_post_to_a_chat() {
    let app = InMemoryApp::new();
    let service = page_service(app.state.clone()).await;
    let alice = signed_up(&service, "alice", "military").await;
    let carol = signed_up(&service, "carol", "military").await;
    actix_test::call_service(
        &service,
        form_post("/consultation_request", &[("body", "need help")], Some(&alice)),
    )
    .await;
    let id = only_open_id(&app).await;

    let res = actix_test::call_service(
        &service,
        form_post(&format!("/chat/{id}"), &[("response", "hi")], Some(&carol)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
