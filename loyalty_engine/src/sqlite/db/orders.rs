use chrono::Utc;
use log::{debug, trace};
use lpg_common::Points;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType, UserId},
    traits::{InsertOrderResult, OrderRegistryError},
};

const ORDER_COLUMNS: &str = "id, number, user_id, status, accrual, registered_at, updated_at";

/// Inserts the order unless an order with the same number already exists, in which case the existing order is
/// returned untouched.
///
/// The insert and the uniqueness check are a single statement, so concurrent callers cannot both succeed.
pub async fn insert_if_absent(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, OrderRegistryError> {
    let sql = format!(
        r#"
            INSERT INTO orders (number, user_id, status, accrual, registered_at, updated_at)
            VALUES ($1, $2, 'NEW', 0, $3, $3)
            ON CONFLICT (number) DO NOTHING
            RETURNING {ORDER_COLUMNS};
        "#
    );
    let inserted = sqlx::query_as::<_, Order>(&sql)
        .bind(&order.number)
        .bind(order.user_id)
        .bind(order.registered_at)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(order) = inserted {
        trace!("🗃️ Order {} inserted with id {}", order.number, order.id);
        return Ok(InsertOrderResult::Inserted(order));
    }
    // Orders are never deleted, so the conflicting row is guaranteed to still be there.
    let existing = fetch_order(&order.number, conn).await?.ok_or_else(|| {
        OrderRegistryError::DatabaseError(format!("Order {} conflicted on insert but cannot be found", order.number))
    })?;
    debug!("🗃️ Order {} already exists (owned by {})", existing.number, existing.user_id);
    Ok(InsertOrderResult::AlreadyExists(existing))
}

pub async fn fetch_order(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderRegistryError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE number = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(number).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches all orders for the user, newest first.
pub async fn fetch_orders_for_user(user: UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderRegistryError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY registered_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).bind(user).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} orders for {user}", orders.len());
    Ok(orders)
}

/// Moves the order to `status`, but only if its current status is one of `status`'s legal predecessors.
///
/// Returns `true` if a row was changed.
pub async fn update_status(
    number: &OrderNumber,
    status: OrderStatusType,
    accrual: Points,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderRegistryError> {
    let predecessors = status.predecessors();
    if predecessors.is_empty() {
        return Ok(false);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
    builder.push_bind(status);
    builder.push(", accrual = ");
    builder.push_bind(accrual);
    builder.push(", updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE number = ");
    builder.push_bind(number.as_str());
    builder.push(" AND status IN (");
    let mut in_clause = builder.separated(", ");
    for p in predecessors {
        in_clause.push_bind(*p);
    }
    in_clause.push_unseparated(")");
    trace!("🗃️ Executing query: {}", builder.sql());
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
