//! Database query functions for the `posts` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{GeneratedPost, Platform, Tone};

/// Fields supplied by the caller when storing a generated post.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub prompt: &'a str,
    pub platform: Platform,
    pub tone: Tone,
    pub content: &'a str,
    pub character_count: i32,
}

/// Insert a new post row. Returns the inserted post with server-generated
/// defaults (id, created_at, updated_at).
pub async fn insert_post(pool: &PgPool, post: &NewPost<'_>) -> Result<GeneratedPost> {
    let row = sqlx::query_as::<_, GeneratedPost>(
        "INSERT INTO posts (prompt, platform, tone, content, character_count) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(post.prompt)
    .bind(post.platform)
    .bind(post.tone)
    .bind(post.content)
    .bind(post.character_count)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert {} post", post.platform))?;

    Ok(row)
}

/// Fetch a post by its ID.
pub async fn get_post(pool: &PgPool, id: Uuid) -> Result<Option<GeneratedPost>> {
    let post = sqlx::query_as::<_, GeneratedPost>("SELECT * FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch post")?;

    Ok(post)
}

/// List all posts, newest first.
pub async fn list_posts(pool: &PgPool) -> Result<Vec<GeneratedPost>> {
    let posts =
        sqlx::query_as::<_, GeneratedPost>("SELECT * FROM posts ORDER BY created_at DESC, id")
            .fetch_all(pool)
            .await
            .context("failed to list posts")?;

    Ok(posts)
}

/// Delete a post by ID. Returns `false` when no such post exists.
pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

/// Count all stored posts.
pub async fn count_posts(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .context("failed to count posts")?;

    Ok(count)
}
