//! Request handler definitions
//!
//! Every route lives here. Handlers stay short: they authenticate, call into the loyalty engine and translate the
//! result into a status code. Anything longer belongs in the engine.
//!
//! Handlers run on actix worker threads, one request at a time per worker, so they must never block. All database and
//! accrual authority calls are async and awaited.
use actix_web::{
    get,
    http::header::AUTHORIZATION,
    web,
    HttpResponse,
    Responder,
};
use log::*;
use loyalty_engine::{
    traits::LoyaltyDatabase,
    AccrualAuthority,
    AuthApi,
    AuthApiError,
    LedgerApi,
    LedgerManagement,
    OrderManagement,
    OrderRegistryApi,
    SubmitOrderResult,
    UserManagement,
};

use crate::{
    auth::{session_cookie, AuthenticatedUser},
    config::SessionConfig,
    data_objects::{Credentials, OrderResponse, WithdrawRequest, WithdrawalResponse},
    errors::ServerError,
    sessions::SessionStore,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

route!(ping => Get "/ping" impl LoyaltyDatabase);
/// Checks that the database is answering.
pub async fn ping<B: LoyaltyDatabase>(db: web::Data<B>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received ping request");
    db.ping().await.map_err(|e| {
        warn!("💻️ Database ping failed. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().body("pong"))
}

//----------------------------------------------   Users  ----------------------------------------------------
fn logged_in_response(token: String, config: &SessionConfig) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session_cookie(&token, config))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .finish()
}

route!(register => Post "/register" impl UserManagement);
/// Creates an account and logs the new user straight in.
pub async fn register<B: UserManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    sessions: web::Data<dyn SessionStore>,
    config: web::Data<SessionConfig>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    debug!("💻️ Registration request for '{login}'");
    let user = api.register(&login, password.reveal()).await.map_err(|e| match e {
        AuthApiError::InvalidCredentials => ServerError::InvalidRequestBody("Login and password are required".into()),
        e => e.into(),
    })?;
    debug!("💻️ '{login}' registered as {}", user.id);
    let token = sessions.create(user.id, config.ttl);
    Ok(logged_in_response(token, &config))
}

route!(login => Post "/login" impl UserManagement);
pub async fn login<B: UserManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AuthApi<B>>,
    sessions: web::Data<dyn SessionStore>,
    config: web::Data<SessionConfig>,
) -> Result<HttpResponse, ServerError> {
    let Credentials { login, password } = body.into_inner();
    debug!("💻️ Login request for '{login}'");
    let user = api.authenticate(&login, password.reveal()).await.map_err(|e| {
        debug!("💻️ Login failed for '{login}'. {e}");
        ServerError::from(e)
    })?;
    let token = sessions.create(user.id, config.ttl);
    Ok(logged_in_response(token, &config))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders" impl OrderManagement, AccrualAuthority);
/// Registers a purchase order number (sent as a plain text body) for the caller.
///
/// * 202: the order is new and now belongs to the caller.
/// * 200: the caller already submitted this order.
/// * 409: another user owns the order.
pub async fn submit_order<B: OrderManagement, A: AccrualAuthority>(
    user: AuthenticatedUser,
    body: String,
    api: web::Data<OrderRegistryApi<B, A>>,
) -> Result<HttpResponse, ServerError> {
    let number = body.trim();
    debug!("💻️ {} submitted order '{number}'", user.id());
    match api.submit_order(user.id(), number).await? {
        SubmitOrderResult::Accepted(order) => {
            info!("💻️ Order {} accepted for {}", order.number, user.id());
            Ok(HttpResponse::Accepted().finish())
        },
        SubmitOrderResult::AlreadyOwnedBySameUser(_) => Ok(HttpResponse::Ok().finish()),
        SubmitOrderResult::OwnedByOtherUser => Err(ServerError::OrderOwnedByOtherUser),
    }
}

route!(my_orders => Get "/orders" impl OrderManagement, AccrualAuthority);
/// Lists the caller's orders, newest first, after bringing pending ones up to date with the accrual authority.
pub async fn my_orders<B: OrderManagement, A: AccrualAuthority>(
    user: AuthenticatedUser,
    api: web::Data<OrderRegistryApi<B, A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching orders for {}", user.id());
    let orders = api.orders_for_user(user.id()).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Ledger  ----------------------------------------------------
route!(balance => Get "/balance" impl LedgerManagement, AccrualAuthority);
pub async fn balance<B: LedgerManagement, A: AccrualAuthority>(
    user: AuthenticatedUser,
    api: web::Data<LedgerApi<B, A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching balance for {}", user.id());
    let balance = api.balance(user.id()).await?;
    Ok(HttpResponse::Ok().json(balance))
}

route!(withdraw => Post "/balance/withdraw" impl LedgerManagement, AccrualAuthority);
/// Spends part of the caller's balance against a new order number.
pub async fn withdraw<B: LedgerManagement, A: AccrualAuthority>(
    user: AuthenticatedUser,
    body: web::Json<WithdrawRequest>,
    api: web::Data<LedgerApi<B, A>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawRequest { order, sum } = body.into_inner();
    debug!("💻️ {} requested a withdrawal of {sum} against order '{order}'", user.id());
    let withdrawal = api.withdraw(user.id(), order.trim(), sum).await.map_err(|e| {
        debug!("💻️ Withdrawal for {} rejected. {e}", user.id());
        ServerError::from(e)
    })?;
    info!("💻️ {} withdrew {} against {}", user.id(), withdrawal.sum, withdrawal.order_number);
    Ok(HttpResponse::Ok().finish())
}

route!(my_withdrawals => Get "/withdrawals" impl LedgerManagement, AccrualAuthority);
pub async fn my_withdrawals<B: LedgerManagement, A: AccrualAuthority>(
    user: AuthenticatedUser,
    api: web::Data<LedgerApi<B, A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Fetching withdrawals for {}", user.id());
    let withdrawals = api.withdrawals_for_user(user.id()).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let withdrawals = withdrawals.into_iter().map(WithdrawalResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(withdrawals))
}
