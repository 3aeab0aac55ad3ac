use crate::db::connection::DbPool;
use crate::db::models::{OptionRow, PollRow};
use crate::domain::{Poll, PollOption};
use sqlx::Error;
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Insert a poll and its options in one transaction. Options keep the
/// submitted order through the `position` column.
pub async fn create_poll(
    pool: &DbPool,
    question: &str,
    description: &str,
    option_texts: &[&str],
    expires_at: Option<DateTime<Utc>>,
) -> Result<Uuid, Error> {
    let poll_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO polls (id, question, description, expires_at) VALUES ($1, $2, $3, $4)")
        .bind(poll_id)
        .bind(question)
        .bind(description)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

    for (position, text) in option_texts.iter().enumerate() {
        sqlx::query(
            "INSERT INTO poll_options (id, poll_id, option_text, position) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(poll_id)
        .bind(text)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(poll_id)
}

pub async fn get_poll_row(pool: &DbPool, poll_id: Uuid) -> Result<Option<PollRow>, Error> {
    let row = sqlx::query_as::<_, PollRow>(
        "SELECT id, question, description, created_at, expires_at, is_active FROM polls WHERE id = $1",
    )
    .bind(poll_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn get_all_poll_rows(pool: &DbPool) -> Result<Vec<PollRow>, Error> {
    let rows = sqlx::query_as::<_, PollRow>(
        "SELECT id, question, description, created_at, expires_at, is_active FROM polls ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_poll_options(pool: &DbPool, poll_id: Uuid) -> Result<Vec<OptionRow>, Error> {
    let rows = sqlx::query_as::<_, OptionRow>(
        "SELECT id, option_text, votes FROM poll_options WHERE poll_id = $1 ORDER BY position",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn close_poll(pool: &DbPool, poll_id: Uuid) -> Result<(), Error> {
    sqlx::query("UPDATE polls SET is_active = FALSE WHERE id = $1")
        .bind(poll_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Assemble the full poll entity, with options in stored order and the
/// total derived from the option counts.
pub async fn load_poll(pool: &DbPool, poll_id: Uuid) -> Result<Option<Poll>, Error> {
    let Some(row) = get_poll_row(pool, poll_id).await? else {
        return Ok(None);
    };
    let options = get_poll_options(pool, poll_id).await?;
    Ok(Some(assemble(row, options)))
}

pub async fn load_all_polls(pool: &DbPool) -> Result<Vec<Poll>, Error> {
    let rows = get_all_poll_rows(pool).await?;
    let mut polls = Vec::with_capacity(rows.len());
    for row in rows {
        let options = get_poll_options(pool, row.id).await?;
        polls.push(assemble(row, options));
    }
    Ok(polls)
}

fn assemble(row: PollRow, options: Vec<OptionRow>) -> Poll {
    let options: Vec<PollOption> = options
        .into_iter()
        .map(|opt| PollOption {
            id: opt.id,
            text: opt.option_text,
            vote_count: opt.votes,
        })
        .collect();
    let total_votes = options.iter().map(|opt| opt.vote_count).sum();

    Poll {
        id: row.id,
        question: row.question,
        description: row.description,
        created_at: row.created_at,
        expires_at: row.expires_at,
        is_active: row.is_active,
        options,
        total_votes,
    }
}
