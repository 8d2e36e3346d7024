use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, error::JsonPayloadError, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use loyalty_engine::{AccrualReconciler, AuthApi, LedgerApi, OrderRegistryApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::accrual::HttpAccrualAuthority,
    routes::{
        health,
        BalanceRoute,
        LoginRoute,
        MyOrdersRoute,
        MyWithdrawalsRoute,
        PingRoute,
        RegisterRoute,
        SubmitOrderRoute,
        WithdrawRoute,
    },
    session_reaper::{start_session_reaper, DEFAULT_REAP_INTERVAL},
    sessions::{InMemorySessionStore, SessionStore},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(config.database_url.reveal(), config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let authority = HttpAccrualAuthority::new(config.accrual.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Using accrual authority at {}", authority.base_url());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let reaper = start_session_reaper(sessions.clone(), DEFAULT_REAP_INTERVAL);
    let srv = create_server_instance(config, db, authority, sessions)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    reaper.abort();
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    authority: HttpAccrualAuthority,
    sessions: Arc<dyn SessionStore>,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let reconciler = AccrualReconciler::new(authority.clone()).with_timeout(config.accrual.timeout);
        let orders_api = OrderRegistryApi::new(db.clone(), reconciler.clone());
        let ledger_api = LedgerApi::new(db.clone(), reconciler);
        let auth_api = AuthApi::new(db.clone());
        let user_scope = web::scope("/api/user")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(SubmitOrderRoute::<SqliteDatabase, HttpAccrualAuthority>::new())
            .service(MyOrdersRoute::<SqliteDatabase, HttpAccrualAuthority>::new())
            .service(BalanceRoute::<SqliteDatabase, HttpAccrualAuthority>::new())
            .service(WithdrawRoute::<SqliteDatabase, HttpAccrualAuthority>::new())
            .service(MyWithdrawalsRoute::<SqliteDatabase, HttpAccrualAuthority>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lpg::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(ledger_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(web::Data::new(config.sessions.clone()))
            .service(user_scope)
            .service(health)
            .service(PingRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies are a 400 with the usual `{"error": ..}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            JsonPayloadError::ContentType => "Expected a JSON body".to_string(),
            e => e.to_string(),
        };
        debug!("💻️ Rejecting request body. {message}");
        ServerError::InvalidRequestBody(message).into()
    })
}
