use crate::db::connection::DbPool;
use sqlx::Error;
use uuid::Uuid;

/// Record a vote and bump the option tally in one transaction. When a voter
/// key is supplied, a marker row per (poll, voter) rejects repeat votes;
/// `RowNotFound` is the sentinel the caller maps to an already-voted error.
pub async fn cast_vote(
    pool: &DbPool,
    poll_id: Uuid,
    option_id: Uuid,
    voter_key: Option<&str>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;

    if let Some(key) = voter_key {
        let existing_vote =
            sqlx::query("SELECT id FROM votes WHERE poll_id = $1 AND voter_key = $2")
                .bind(poll_id)
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;

        if existing_vote.is_some() {
            tx.rollback().await?;
            return Err(sqlx::Error::RowNotFound);
        }
    }

    let vote_id = Uuid::new_v4();
    sqlx::query("INSERT INTO votes (id, poll_id, option_id, voter_key) VALUES ($1, $2, $3, $4)")
        .bind(vote_id)
        .bind(poll_id)
        .bind(option_id)
        .bind(voter_key)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE poll_options SET votes = votes + 1 WHERE id = $1")
        .bind(option_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn voter_has_voted(
    pool: &DbPool,
    poll_id: Uuid,
    voter_key: &str,
) -> Result<bool, Error> {
    let row = sqlx::query("SELECT id FROM votes WHERE poll_id = $1 AND voter_key = $2")
        .bind(poll_id)
        .bind(voter_key)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
