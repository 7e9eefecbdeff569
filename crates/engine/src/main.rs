//! LevelForge Engine - batch generation runner.
//!
//! Reads a batch request (JSON file path as the first argument, or a built-in
//! demo request), runs it as a background job and prints the outcome.
//! Ctrl-C cancels the running batch; items finished so far are kept.

use std::sync::Arc;
use std::time::Duration;

use levelforge_domain::{
    BatchRequest, ConfigVariation, EntityRequest, EntityType, GenerationConfig, JobResult,
    JobStatus,
};
use levelforge_engine::infrastructure::config::EngineConfig;
use levelforge_engine::App;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "levelforge_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LevelForge Engine");

    let config = EngineConfig::from_env();
    let sweep_interval = config.sweep_interval;
    let app = Arc::new(App::new(config));

    // Spawn expiry sweeper
    let sweeper = app.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweeper.sweep_expired().await {
                tracing::warn!(error = %e, "Failed to sweep expired jobs");
            }
        }
    });

    let request = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading batch request");
            serde_json::from_str::<BatchRequest>(&std::fs::read_to_string(&path)?)?
        }
        None => demo_request(),
    };

    let job_id = app.use_cases.batch.submit.execute(request).await?;
    tracing::info!(job_id = %job_id, "Batch submitted");

    let mut last_progress = None;
    let mut job = loop {
        let Some(job) = app.jobs.get(job_id).await? else {
            anyhow::bail!("job {job_id} disappeared before finishing");
        };
        if job.status().is_terminal() {
            break job;
        }
        if last_progress != Some(job.progress()) {
            last_progress = Some(job.progress());
            tracing::info!(
                job_id = %job_id,
                progress = job.progress(),
                message = job.message().unwrap_or_default(),
                "Batch progress"
            );
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(job_id = %job_id, "Interrupt received, cancelling batch");
                if let Err(e) = app.jobs.cancel(job_id, "interrupted").await {
                    tracing::warn!(error = %e, "Failed to cancel batch");
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    };

    // The runner attaches partial results right after it notices a cancel
    for _ in 0..20 {
        if job.result().is_some() || job.status() != JobStatus::Cancelled {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        match app.jobs.get(job_id).await? {
            Some(latest) => job = latest,
            None => break,
        }
    }

    println!("job {} finished: {}", job.id(), job.status());
    if let Some(error) = job.error() {
        println!("error: {error}");
    }
    if let Some(batch) = job.result().and_then(JobResult::as_batch) {
        println!(
            "{} of {} items processed, {} succeeded, {} failed",
            batch.completed_count, batch.total_items, batch.succeeded, batch.failed
        );
        for item in &batch.items {
            match (&item.level, &item.error) {
                (Some(level), _) => println!(
                    "  [{}:{}] {} ({} entities)",
                    item.variation_index,
                    item.batch_index,
                    level.name,
                    level.entities.len()
                ),
                (None, error) => println!(
                    "  [{}:{}] seed {} failed: {}",
                    item.variation_index,
                    item.batch_index,
                    item.seed,
                    error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }

    Ok(())
}

/// Small maze batch over two difficulty settings.
fn demo_request() -> BatchRequest {
    let base = GenerationConfig::new(20, 20, 1, "maze")
        .with_entity(EntityRequest::new(EntityType::Player, 1))
        .with_entity(EntityRequest::new(EntityType::Enemy, 4))
        .with_entity(EntityRequest::new(EntityType::Exit, 1));
    BatchRequest::new(base, 2).with_variation(ConfigVariation::new(
        "gameplay.difficulty",
        vec![json!("easy"), json!("hard")],
    ))
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
