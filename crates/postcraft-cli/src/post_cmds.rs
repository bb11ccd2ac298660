//! `postcraft generate|list|delete|probe` commands.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use postcraft_core::orchestrator::{
    GenerateError, GenerationContext, GenerationRequest, OutcomeStatus, run_generation,
    run_report,
};
use postcraft_core::probe::{self, KeyDisplay, ProbeReport};
use postcraft_core::provider::TextGenerator;
use postcraft_db::models::GeneratedPost;
use postcraft_db::queries::posts as post_db;

/// Run the generate command.
///
/// In abort mode the first failing platform ends the run with an error that
/// names any posts already stored. With `report` every platform is attempted
/// and the command fails only if all of them did.
pub async fn run_generate(
    ctx: &GenerationContext,
    topic: &str,
    platforms: &[String],
    tone: &str,
    report: bool,
) -> Result<()> {
    let request = GenerationRequest::parse(topic, platforms, tone)?;

    if !report {
        let result = run_generation(ctx, &request).await;
        return match result {
            Ok(posts) => {
                for post in &posts {
                    print_post(post);
                }
                println!("{} post(s) generated.", posts.len());
                Ok(())
            }
            Err(e) => {
                if !e.persisted().is_empty() {
                    eprintln!("Stored before the failure:");
                    for id in e.persisted() {
                        eprintln!("  {id}");
                    }
                }
                if let GenerateError::Generation { error, .. } = &e {
                    for hint in error.suggestions(ctx.generator.model()) {
                        eprintln!("  hint: {hint}");
                    }
                }
                Err(e.into())
            }
        };
    }

    let outcome = run_report(ctx, &request).await;
    for item in &outcome.outcomes {
        match &item.status {
            OutcomeStatus::Generated { post } => print_post(post),
            OutcomeStatus::Failed { kind, message } => {
                println!("[{}] FAILED ({kind}): {message}", item.platform);
                println!();
            }
        }
    }
    println!(
        "{} generated, {} failed.",
        outcome.succeeded(),
        outcome.failed()
    );

    if outcome.succeeded() == 0 {
        anyhow::bail!("no posts were generated");
    }
    Ok(())
}

/// Run the list command: every stored post, newest first.
pub async fn run_list(pool: &PgPool) -> Result<()> {
    let posts = post_db::list_posts(pool).await?;

    if posts.is_empty() {
        println!("No posts found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<10} {:<13} {:>6}  CREATED",
        "ID", "PLATFORM", "TONE", "CHARS"
    );
    println!("{}", "-".repeat(90));
    for post in &posts {
        println!(
            "{:<38} {:<10} {:<13} {:>6}  {}",
            post.id,
            post.platform,
            post.tone,
            post.character_count,
            post.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    println!();
    println!("{} post(s).", posts.len());

    Ok(())
}

/// Run the delete command.
pub async fn run_delete(pool: &PgPool, id_str: &str) -> Result<()> {
    let id = Uuid::parse_str(id_str).with_context(|| format!("invalid post ID: {id_str}"))?;

    if !post_db::delete_post(pool, id).await? {
        anyhow::bail!("post {id} not found");
    }

    println!("Post {id} deleted.");
    Ok(())
}

/// Run the probe command against the configured provider.
pub async fn run_probe(generator: &dyn TextGenerator, key: KeyDisplay) -> Result<()> {
    let report = probe::probe(generator, key).await;

    match &report {
        ProbeReport::Success {
            test_response,
            key,
            model,
            ..
        } => {
            println!("API key is valid and working.");
            println!("  model:    {model}");
            println!("  key:      {} ({} chars)", key.api_key_prefix, key.api_key_length);
            println!("  response: {}", test_response.trim());
            Ok(())
        }
        ProbeReport::Failure {
            kind,
            message,
            details,
            suggestions,
            key,
            model,
            ..
        } => {
            eprintln!("API key test failed ({kind}): {message}");
            eprintln!("  model:   {model}");
            eprintln!("  key:     {} ({} chars)", key.api_key_prefix, key.api_key_length);
            eprintln!("  details: {details}");
            for hint in suggestions {
                eprintln!("  hint: {hint}");
            }
            anyhow::bail!("probe failed")
        }
    }
}

fn print_post(post: &GeneratedPost) {
    println!(
        "[{}] {} ({} chars, {})",
        post.platform, post.id, post.character_count, post.tone
    );
    println!("{}", post.content);
    println!();
}
