use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::{
    db_types::OrderStatusType,
    traits::InsertOrderResult,
    AccrualAuthorityError,
    AccrualReconciler,
    AccrualReport,
    OrderRegistryApi,
};
use lpg_common::Points;
use serde_json::Value;

use super::{helpers::*, mocks::*};
use crate::routes::{MyOrdersRoute, SubmitOrderRoute};

fn configure(db: MockDatabase, authority: MockAuthority) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderRegistryApi::new(db, AccrualReconciler::new(authority));
        cfg.service(SubmitOrderRoute::<MockDatabase, MockAuthority>::new())
            .service(MyOrdersRoute::<MockDatabase, MockAuthority>::new())
            .app_data(web::Data::new(api));
    }
}

fn submit(token: &str, body: &str) -> TestRequest {
    with_token(TestRequest::post().uri("/orders"), token).insert_header(("Content-Type", "text/plain")).set_payload(body.to_string())
}

fn untouched_db() -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_insert_order_if_absent().never();
    db
}

#[actix_web::test]
async fn submit_order_without_session() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/orders").set_payload("12345678903");
    let res = call(req, sessions(), configure(untouched_db(), idle_authority())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("error"), "was: {}", res.body);
}

#[actix_web::test]
async fn submit_new_order() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_insert_order_if_absent()
        .withf(|o| o.number.as_str() == "12345678903" && o.user_id == ALICE)
        .times(1)
        .returning(|o| Ok(InsertOrderResult::Inserted(order(1, o.number.as_str(), o.user_id, OrderStatusType::New, 0))));
    let res = call(submit(&token, "12345678903\n"), sessions, configure(db, idle_authority())).await;
    assert_eq!(res.status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn resubmit_own_order() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_insert_order_if_absent()
        .returning(|o| Ok(InsertOrderResult::AlreadyExists(order(1, o.number.as_str(), ALICE, OrderStatusType::New, 0))));
    let res = call(submit(&token, "12345678903"), sessions, configure(db, idle_authority())).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn submit_order_owned_by_someone_else() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, BOB);
    let mut db = MockDatabase::new();
    db.expect_insert_order_if_absent()
        .returning(|o| Ok(InsertOrderResult::AlreadyExists(order(1, o.number.as_str(), ALICE, OrderStatusType::New, 0))));
    let res = call(submit(&token, "12345678903"), sessions, configure(db, idle_authority())).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn submit_order_with_bad_checksum() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let res = call(submit(&token, "79927398710"), sessions, configure(untouched_db(), idle_authority())).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn submit_malformed_order_number() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    for body in ["", "12a45", "-1234"] {
        let res = call(submit(&token, body), sessions.clone(), configure(untouched_db(), idle_authority())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {body:?}");
    }
}

#[actix_web::test]
async fn no_orders_yet() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    let req = with_token(TestRequest::get().uri("/orders"), &token);
    let res = call(req, sessions, configure(db, idle_authority())).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());
}

#[actix_web::test]
async fn listing_orders_reconciles_pending_ones() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().withf(|u| *u == ALICE).returning(|u| {
        Ok(vec![
            order(2, "12345678903", u, OrderStatusType::New, 0),
            order(1, "79927398713", u, OrderStatusType::Invalid, 0),
        ])
    });
    db.expect_apply_order_updates()
        .withf(|updates| {
            updates.len() == 1
                && updates[0].number.as_str() == "12345678903"
                && updates[0].status == OrderStatusType::Processed
                && updates[0].accrual == Points::from_points(500)
        })
        .times(1)
        .returning(|updates| Ok(updates.len()));
    let mut authority = MockAuthority::new();
    // Terminal orders are never sent to the authority
    authority
        .expect_fetch_accrual()
        .withf(|n| n.as_str() == "12345678903")
        .times(1)
        .returning(|n| Ok(Some(AccrualReport::new(n.as_str(), "PROCESSED", Some(Points::from_points(500))))));
    let req = with_token(TestRequest::get().uri("/orders"), &token);
    let res = call(req, sessions, configure(db, authority)).await;
    assert_eq!(res.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&res.body).unwrap();
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["number"], "12345678903");
    assert_eq!(orders[0]["status"], "PROCESSED");
    assert_eq!(orders[0]["accrual"], 500.0);
    assert_eq!(orders[0]["uploaded_at"], "2024-06-01T12:00:00+00:00");
    assert_eq!(orders[1]["status"], "INVALID");
    assert!(orders[1].get("accrual").is_none());
}

#[actix_web::test]
async fn unreachable_authority_serves_stored_orders() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user()
        .returning(|u| Ok(vec![order(1, "12345678903", u, OrderStatusType::Processing, 0)]));
    db.expect_apply_order_updates().never();
    let mut authority = MockAuthority::new();
    authority.expect_fetch_accrual().returning(|_| Err(AccrualAuthorityError::Unreachable("connection refused".into())));
    let req = with_token(TestRequest::get().uri("/orders"), &token);
    let res = call(req, sessions, configure(db, authority)).await;
    assert_eq!(res.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json[0]["status"], "PROCESSING");
}
