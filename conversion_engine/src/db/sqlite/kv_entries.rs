use sqlx::SqliteConnection;

pub async fn fetch_live_value(key: &str, now: i64, conn: &mut SqliteConnection) -> Result<Option<String>, sqlx::Error> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = $1 AND expires_at > $2")
        .bind(key)
        .bind(now)
        .fetch_optional(conn)
        .await?;
    Ok(value)
}

pub async fn upsert(key: &str, value: &str, expires_at: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO kv_entries (key, value, expires_at) VALUES ($1, $2, $3)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at"#,
    )
    .bind(key)
    .bind(value)
    .bind(expires_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Inserts the entry unless a live entry already exists. An expired entry is overwritten in the same statement, so
/// two racing callers can never both win.
pub async fn insert_if_absent(
    key: &str,
    value: &str,
    expires_at: i64,
    now: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO kv_entries (key, value, expires_at) VALUES ($1, $2, $3)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
        WHERE kv_entries.expires_at <= $4"#,
    )
    .bind(key)
    .bind(value)
    .bind(expires_at)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete(key: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM kv_entries WHERE key = $1").bind(key).execute(conn).await?;
    Ok(())
}

pub async fn delete_expired(now: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at <= $1").bind(now).execute(conn).await?;
    Ok(result.rows_affected())
}
