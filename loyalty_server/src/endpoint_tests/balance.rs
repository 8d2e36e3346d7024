use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::{db_types::Balance, traits::AppendWithdrawalResult, AccrualReconciler, LedgerApi};
use lpg_common::Points;
use serde_json::{json, Value};

use super::{helpers::*, mocks::*};
use crate::routes::{BalanceRoute, MyWithdrawalsRoute, WithdrawRoute};

fn configure(db: MockDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = LedgerApi::new(db, AccrualReconciler::new(idle_authority()));
        cfg.service(BalanceRoute::<MockDatabase, MockAuthority>::new())
            .service(WithdrawRoute::<MockDatabase, MockAuthority>::new())
            .service(MyWithdrawalsRoute::<MockDatabase, MockAuthority>::new())
            .app_data(web::Data::new(api));
    }
}

/// A ledger holding `current` points for everyone, with no pending orders to reconcile.
fn ledger_with_balance(current: i64, withdrawn: i64) -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    db.expect_fetch_balance().returning(move |_| {
        Ok(Balance { current: Points::from_points(current), withdrawn: Points::from_points(withdrawn) })
    });
    db
}

fn withdraw(token: &str, body: Value) -> TestRequest {
    with_token(TestRequest::post().uri("/balance/withdraw"), token).set_json(body)
}

#[actix_web::test]
async fn balance_requires_a_session() {
    let _ = env_logger::try_init().ok();
    let req = with_token(TestRequest::get().uri("/balance"), "not-a-real-token");
    let res = call(req, sessions(), configure(MockDatabase::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_balance() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let req = with_token(TestRequest::get().uri("/balance"), &token);
    let res = call(req, sessions, configure(ledger_with_balance(300, 200))).await;
    assert_eq!(res.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json, json!({"current": 300.0, "withdrawn": 200.0}));
}

#[actix_web::test]
async fn successful_withdrawal() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = ledger_with_balance(500, 0);
    db.expect_append_withdrawal()
        .withf(|w| w.order_number.as_str() == "2377225624" && w.sum == Points::from_points(200) && w.user_id == ALICE)
        .times(1)
        .returning(|w| Ok(AppendWithdrawalResult::Appended(withdrawal(1, w.order_number.as_str(), w.user_id, 200))));
    let res = call(withdraw(&token, json!({"order": "2377225624", "sum": 200})), sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn withdrawal_exceeding_balance() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = ledger_with_balance(300, 200);
    db.expect_append_withdrawal().never();
    let res = call(withdraw(&token, json!({"order": "2377225624", "sum": 400})), sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::PAYMENT_REQUIRED);
    assert!(res.body.contains("Insufficient funds"), "was: {}", res.body);
}

#[actix_web::test]
async fn withdrawal_that_loses_a_race() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = ledger_with_balance(300, 0);
    db.expect_append_withdrawal()
        .returning(|_| Ok(AppendWithdrawalResult::InsufficientFunds { available: Points::from_points(100) }));
    let res = call(withdraw(&token, json!({"order": "2377225624", "sum": 250})), sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn withdrawal_against_bad_order_number() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    for order in ["2377225625", "not-a-number"] {
        let mut db = MockDatabase::new();
        db.expect_append_withdrawal().never();
        let res = call(withdraw(&token, json!({"order": order, "sum": 10})), sessions.clone(), configure(db)).await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "order: {order}");
    }
}

#[actix_web::test]
async fn duplicate_withdrawal() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = ledger_with_balance(500, 200);
    db.expect_append_withdrawal().returning(|_| Ok(AppendWithdrawalResult::DuplicateOrderNumber));
    let res = call(withdraw(&token, json!({"order": "2377225624", "sum": 10})), sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn malformed_withdrawal_requests() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let bodies = [json!({"order": "2377225624"}), json!({"sum": 10}), json!({"order": "2377225624", "sum": "ten"})];
    for body in bodies {
        let res = call(withdraw(&token, body.clone()), sessions.clone(), configure(MockDatabase::new())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body: {body}");
    }
    let res = call(withdraw(&token, json!({"order": "2377225624", "sum": -5})), sessions, configure(MockDatabase::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn no_withdrawals_yet() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, ALICE);
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().times(1).returning(|_| Ok(vec![]));
    db.expect_fetch_withdrawals_for_user().returning(|_| Ok(vec![]));
    let req = with_token(TestRequest::get().uri("/withdrawals"), &token);
    let res = call(req, sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn withdrawal_history() {
    let _ = env_logger::try_init().ok();
    let sessions = sessions();
    let token = login_as(&sessions, BOB);
    let mut db = MockDatabase::new();
    db.expect_fetch_orders_for_user().withf(|u| *u == BOB).times(1).returning(|_| Ok(vec![]));
    db.expect_fetch_withdrawals_for_user()
        .withf(|u| *u == BOB)
        .returning(|u| Ok(vec![withdrawal(2, "2377225624", u, 200), withdrawal(1, "79927398713", u, 50)]));
    let req = with_token(TestRequest::get().uri("/withdrawals"), &token);
    let res = call(req, sessions, configure(db)).await;
    assert_eq!(res.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(
        json,
        json!([
            {"order": "2377225624", "sum": 200.0, "processed_at": "2024-06-02T09:30:00+00:00"},
            {"order": "79927398713", "sum": 50.0, "processed_at": "2024-06-02T09:30:00+00:00"}
        ])
    );
}
