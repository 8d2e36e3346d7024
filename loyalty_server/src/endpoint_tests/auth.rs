use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use loyalty_engine::{
    db_types::{User, UserId},
    helpers::hash_password,
    traits::InsertUserResult,
    AccrualReconciler,
    AuthApi,
    OrderRegistryApi,
};
use serde_json::json;

use super::{helpers::*, mocks::*};
use crate::{
    auth::SESSION_COOKIE,
    routes::{LoginRoute, MyOrdersRoute, RegisterRoute},
    sessions::SessionStore,
};

fn configure(db: MockDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(RegisterRoute::<MockDatabase>::new())
            .service(LoginRoute::<MockDatabase>::new())
            .app_data(web::Data::new(AuthApi::new(db)));
    }
}

fn alice(password: &str) -> User {
    let salt = "0123456789abcdef".to_string();
    User {
        id: ALICE,
        login: "alice".into(),
        password_hash: hash_password(&salt, password).unwrap(),
        salt,
        created_at: Utc::now(),
    }
}

fn registering_db() -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_insert_user().returning(|u| {
        if u.login == "alice" {
            Ok(InsertUserResult::LoginTaken)
        } else {
            Ok(InsertUserResult::Inserted(User {
                id: UserId(7),
                login: u.login,
                password_hash: u.password_hash,
                salt: u.salt,
                created_at: Utc::now(),
            }))
        }
    });
    db
}

fn login_db() -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_fetch_user_by_login()
        .returning(|login| Ok((login == "alice").then(|| alice("correct horse battery staple"))));
    db
}

#[actix_web::test]
async fn register_new_user() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let req = TestRequest::post().uri("/register").set_json(json!({"login": "carol", "password": "s3cret"}));
    let res = call(req, sessions.clone(), configure(registering_db())).await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.session_cookie.expect("No session cookie was set");
    assert_eq!(sessions.get(&token).unwrap().user_id, UserId(7));
}

#[actix_web::test]
async fn register_taken_login() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/register").set_json(json!({"login": "alice", "password": "s3cret"}));
    let res = call(req, sessions(), configure(registering_db())).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.session_cookie.is_none());
}

#[actix_web::test]
async fn register_malformed_requests() {
    let _ = env_logger::try_init().ok();
    let bodies = [json!({"login": "carol"}), json!({"login": "", "password": "s3cret"}), json!({"login": "carol", "password": ""})];
    for body in bodies {
        let mut db = MockDatabase::new();
        db.expect_insert_user().never();
        let req = TestRequest::post().uri("/register").set_json(body.clone());
        let res = call(req, sessions(), configure(db)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {body}");
    }
    let req = TestRequest::post().uri("/register").insert_header(("Content-Type", "application/json")).set_payload("{login:");
    let res = call(req, sessions(), configure(MockDatabase::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.starts_with(r#"{"error":"#), "was: {}", res.body);
}

#[actix_web::test]
async fn login_with_valid_credentials() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let req = TestRequest::post()
        .uri("/login")
        .set_json(json!({"login": "alice", "password": "correct horse battery staple"}));
    let res = call(req, sessions.clone(), configure(login_db())).await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.session_cookie.expect("No session cookie was set");
    assert_eq!(sessions.get(&token).unwrap().user_id, ALICE);
}

#[actix_web::test]
async fn login_with_invalid_credentials() {
    let _ = env_logger::try_init().ok();
    for (login, password) in [("alice", "wrong"), ("mallory", "correct horse battery staple")] {
        let req = TestRequest::post().uri("/login").set_json(json!({"login": login, "password": password}));
        let res = call(req, sessions(), configure(login_db())).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "login: {login}");
        assert!(res.session_cookie.is_none());
    }
}

fn orders_only(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    let api = OrderRegistryApi::new(db, AccrualReconciler::new(idle_authority()));
    cfg.service(MyOrdersRoute::<MockDatabase, MockAuthority>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn session_cookie_is_accepted() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let req = TestRequest::get().uri("/orders").cookie(Cookie::new(SESSION_COOKIE, token));
    let res = call(req, sessions, orders_only).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn expired_session_is_rejected() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = sessions.create(ALICE, Duration::seconds(-1));
    let req = with_token(TestRequest::get().uri("/orders"), &token);
    let res = call(req, sessions, orders_only).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
