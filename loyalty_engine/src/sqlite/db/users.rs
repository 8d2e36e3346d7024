use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    traits::{AuthApiError, InsertUserResult},
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<InsertUserResult, AuthApiError> {
    let inserted = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (login, password_hash, salt, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (login) DO NOTHING
            RETURNING id, login, password_hash, salt, created_at;
        "#,
    )
    .bind(&user.login)
    .bind(&user.password_hash)
    .bind(&user.salt)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    match inserted {
        Some(user) => Ok(InsertUserResult::Inserted(user)),
        None => {
            debug!("🗃️ Login '{}' is already taken", user.login);
            Ok(InsertUserResult::LoginTaken)
        },
    }
}

pub async fn fetch_user_by_login(login: &str, conn: &mut SqliteConnection) -> Result<Option<User>, AuthApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, login, password_hash, salt, created_at FROM users WHERE login = $1",
    )
    .bind(login)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}
