use log::{debug, trace};
use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Balance, NewWithdrawal, OrderNumber, UserId, Withdrawal},
    sqlite::db::is_unique_violation,
    traits::{AppendWithdrawalResult, LedgerError},
};

/// Records the withdrawal if, at the instant of the insert, the user's balance covers `sum`.
///
/// The balance is computed in the same statement as the insert, so two concurrent withdrawals can never jointly
/// overdraw the account.
pub async fn append(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<AppendWithdrawalResult, LedgerError> {
    let result = sqlx::query_as::<_, Withdrawal>(
        r#"
            INSERT INTO withdrawals (order_number, user_id, sum, processed_at)
            SELECT $1, $2, $3, $4
            WHERE
                (SELECT COALESCE(SUM(accrual), 0) FROM orders WHERE user_id = $2 AND status = 'PROCESSED') -
                (SELECT COALESCE(SUM(sum), 0) FROM withdrawals WHERE user_id = $2) >= $3
            RETURNING id, order_number, user_id, sum, processed_at;
        "#,
    )
    .bind(&withdrawal.order_number)
    .bind(withdrawal.user_id)
    .bind(withdrawal.sum)
    .bind(withdrawal.processed_at)
    .fetch_optional(&mut *conn)
    .await;
    match result {
        Ok(Some(w)) => {
            trace!("🗃️ Withdrawal #{} of {} recorded for {}", w.id, w.sum, w.user_id);
            Ok(AppendWithdrawalResult::Appended(w))
        },
        Err(e) if is_unique_violation(&e) => {
            debug!("🗃️ A withdrawal against order {} already exists", withdrawal.order_number);
            Ok(AppendWithdrawalResult::DuplicateOrderNumber)
        },
        Err(e) => Err(e.into()),
        Ok(None) => {
            if withdrawal_exists(&withdrawal.order_number, conn).await? {
                return Ok(AppendWithdrawalResult::DuplicateOrderNumber);
            }
            let available = balance(withdrawal.user_id, conn).await?.current;
            debug!("🗃️ Withdrawal of {} for {} rejected. Balance is {available}", withdrawal.sum, withdrawal.user_id);
            Ok(AppendWithdrawalResult::InsufficientFunds { available })
        },
    }
}

pub async fn withdrawal_exists(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM withdrawals WHERE order_number = $1")
        .bind(number)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// Fetches all withdrawals for the user, newest first.
pub async fn fetch_for_user(user: UserId, conn: &mut SqliteConnection) -> Result<Vec<Withdrawal>, LedgerError> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>(
        r#"
            SELECT id, order_number, user_id, sum, processed_at
            FROM withdrawals
            WHERE user_id = $1
            ORDER BY processed_at DESC, id DESC;
        "#,
    )
    .bind(user)
    .fetch_all(conn)
    .await?;
    Ok(withdrawals)
}

pub async fn balance(user: UserId, conn: &mut SqliteConnection) -> Result<Balance, LedgerError> {
    let (accrued, withdrawn): (i64, i64) = sqlx::query_as(
        r#"
            SELECT
                (SELECT COALESCE(SUM(accrual), 0) FROM orders WHERE user_id = $1 AND status = 'PROCESSED'),
                (SELECT COALESCE(SUM(sum), 0) FROM withdrawals WHERE user_id = $1);
        "#,
    )
    .bind(user)
    .fetch_one(conn)
    .await?;
    Ok(Balance::new(Points::from(accrued), Points::from(withdrawn)))
}
