use std::sync::Arc;

use actix_web::{
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use loyalty_engine::db_types::{Order, OrderNumber, OrderStatusType, UserId, Withdrawal};
use lpg_common::Points;

use crate::{
    auth::SESSION_COOKIE,
    config::SessionConfig,
    server::json_config,
    sessions::{InMemorySessionStore, SessionStore},
};

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);

pub struct Response {
    pub status: StatusCode,
    pub body: String,
    pub session_cookie: Option<String>,
}

pub fn sessions() -> Arc<InMemorySessionStore> {
    Arc::new(InMemorySessionStore::new())
}

/// Logs `user` in directly and returns the session token.
pub fn login_as(sessions: &InMemorySessionStore, user: UserId) -> String {
    sessions.create(user, Duration::hours(1))
}

/// Runs a single request against an app built from `configure`, with the JSON and session plumbing the real server
/// installs.
pub async fn call<F>(req: TestRequest, sessions: Arc<InMemorySessionStore>, configure: F) -> Response
where F: FnOnce(&mut ServiceConfig) {
    let store: Arc<dyn SessionStore> = sessions;
    let app = App::new()
        .app_data(json_config())
        .app_data(web::Data::from(store))
        .app_data(web::Data::new(SessionConfig::default()))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let session_cookie = res.response().cookies().find(|c| c.name() == SESSION_COOKIE).map(|c| c.value().to_string());
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    Response { status, body, session_cookie }
}

pub fn with_token(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn timestamp(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn number(s: &str) -> OrderNumber {
    OrderNumber::parse(s).unwrap()
}

pub fn order(id: i64, num: &str, user: UserId, status: OrderStatusType, accrual: i64) -> Order {
    Order {
        id,
        number: number(num),
        user_id: user,
        status,
        accrual: Points::from_points(accrual),
        registered_at: timestamp("2024-06-01T12:00:00Z"),
        updated_at: timestamp("2024-06-01T12:00:00Z"),
    }
}

pub fn withdrawal(id: i64, num: &str, user: UserId, sum: i64) -> Withdrawal {
    Withdrawal {
        id,
        order_number: number(num),
        user_id: user,
        sum: Points::from_points(sum),
        processed_at: timestamp("2024-06-02T09:30:00Z"),
    }
}
