use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use loyalty_engine::SqliteDatabase;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use super::helpers::*;
use crate::routes::{health, PingRoute};

async fn scratch_db() -> SqliteDatabase {
    let name: String = thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    let path = std::env::temp_dir().join(format!("lpg_ping_{name}.db"));
    let url = format!("sqlite://{}", path.display());
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database")
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(health).service(PingRoute::<SqliteDatabase>::new()).app_data(web::Data::new(db));
    }
}

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let res = call(TestRequest::get().uri("/health"), sessions(), configure(scratch_db().await)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[actix_web::test]
async fn ping_reaches_the_database() {
    let _ = env_logger::try_init().ok();
    let res = call(TestRequest::get().uri("/ping"), sessions(), configure(scratch_db().await)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "pong");
}

#[actix_web::test]
async fn ping_fails_when_the_database_is_gone() {
    let _ = env_logger::try_init().ok();
    let db = scratch_db().await;
    db.pool().close().await;
    let res = call(TestRequest::get().uri("/ping"), sessions(), configure(db)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}
