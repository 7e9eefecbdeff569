//! Batch runs from submission to completion.

use std::time::Duration;

use levelforge_domain::{
    BatchRequest, ConfigVariation, EntityRequest, EntityType, GenerationConfig, JobResult,
    JobStatus,
};
use serde_json::json;

use crate::test_fixtures::{wait_for_terminal, TestHarness};

#[tokio::test]
async fn maze_batch_expands_into_four_seeded_levels() {
    let harness = TestHarness::new();
    let request = BatchRequest::new(GenerationConfig::new(20, 20, 1, "maze"), 2).with_variation(
        ConfigVariation::new("gameplay.difficulty", vec![json!("easy"), json!("hard")]),
    );

    let job_id = harness.batch.submit.execute(request).await.expect("submit");
    let job = wait_for_terminal(&harness.jobs, job_id).await;

    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress(), 100);
    assert_eq!(job.metadata().completed_items, 4);

    let batch = job.result().and_then(JobResult::as_batch).expect("batch result");
    assert_eq!((batch.total_items, batch.succeeded, batch.failed), (4, 4, 0));

    let coords: Vec<(u32, u32, i64)> = batch
        .items
        .iter()
        .map(|item| (item.variation_index, item.batch_index, item.seed))
        .collect();
    assert_eq!(coords, vec![(0, 0, 1), (0, 1, 2), (1, 0, 1), (1, 1, 2)]);

    let levels: Vec<_> = batch
        .items
        .iter()
        .map(|item| item.level.as_ref().expect("level"))
        .collect();
    assert_eq!(levels[0].gameplay.difficulty, "easy");
    assert_eq!(levels[2].gameplay.difficulty, "hard");
    assert_eq!(levels[0].name, "maze-20x20-1");
    assert_eq!(levels[1].name, "maze-20x20-2");
    // Difficulty does not feed the maze, so equal seeds give equal terrain
    assert_eq!(levels[0].grid, levels[2].grid);
    assert_ne!(levels[0].grid, levels[1].grid);
}

#[tokio::test]
async fn failed_items_are_recorded_without_failing_the_job() {
    let harness = TestHarness::new();
    let request = BatchRequest::new(GenerationConfig::new(16, 16, 10, "maze"), 2).with_variation(
        ConfigVariation::new("generationAlgorithm", vec![json!("broken"), json!("rooms")]),
    );

    let job_id = harness.batch.submit.execute(request).await.expect("submit");
    let job = wait_for_terminal(&harness.jobs, job_id).await;

    assert_eq!(job.status(), JobStatus::Completed);
    let batch = job.result().and_then(JobResult::as_batch).expect("batch result");
    assert_eq!((batch.succeeded, batch.failed, batch.completed_count), (2, 2, 4));

    for item in &batch.items[..2] {
        assert!(item.level.is_none());
        assert!(item
            .error
            .as_deref()
            .is_some_and(|error| error.contains("panicked")));
    }
    for item in &batch.items[2..] {
        assert!(item.is_success());
    }
    assert_eq!(batch.items[1].seed, 11);
}

#[tokio::test]
async fn batch_levels_carry_placed_entities() {
    let harness = TestHarness::new();
    let base = GenerationConfig::new(30, 30, 4, "cellular")
        .with_entity(EntityRequest::new(EntityType::Player, 1))
        .with_entity(EntityRequest::new(EntityType::Enemy, 3));

    let job_id = harness
        .batch
        .submit
        .execute(BatchRequest::new(base, 3))
        .await
        .expect("submit");
    let job = wait_for_terminal(&harness.jobs, job_id).await;

    let batch = job.result().and_then(JobResult::as_batch).expect("batch result");
    for item in &batch.items {
        let level = item.level.as_ref().expect("level");
        assert_eq!(level.metadata.seed, item.seed);
        for entity in &level.entities {
            assert!(level.grid.is_walkable_at(entity.position));
        }
    }
}

#[tokio::test]
async fn cancelling_a_completed_batch_keeps_it_completed() {
    let harness = TestHarness::new();
    let job_id = harness
        .batch
        .submit
        .execute(BatchRequest::new(GenerationConfig::new(12, 12, 1, "noise"), 1))
        .await
        .expect("submit");
    wait_for_terminal(&harness.jobs, job_id).await;

    let err = harness
        .jobs
        .cancel(job_id, "too late")
        .await
        .expect_err("already terminal");

    assert_eq!(err.terminal_status(), Some(JobStatus::Completed));
    let job = harness.jobs.get(job_id).await.expect("get").expect("present");
    assert_eq!(job.status(), JobStatus::Completed);
    assert!(job.result().and_then(JobResult::as_batch).is_some());
}

#[tokio::test]
async fn session_jobs_are_listed_newest_first() {
    let harness = TestHarness::new();
    let request = || {
        BatchRequest::new(GenerationConfig::new(10, 10, 1, "maze"), 1).with_session("table-4")
    };

    let first = harness.batch.submit.execute(request()).await.expect("submit");
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = harness.batch.submit.execute(request()).await.expect("submit");
    harness
        .batch
        .submit
        .execute(BatchRequest::new(GenerationConfig::new(10, 10, 1, "maze"), 1))
        .await
        .expect("submit");

    let ids: Vec<_> = harness
        .jobs
        .list_for_session("table-4")
        .await
        .expect("list")
        .iter()
        .map(|job| job.id())
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn sweep_removes_expired_jobs() {
    let harness = TestHarness::new();
    let job_id = harness
        .batch
        .submit
        .execute(BatchRequest::new(GenerationConfig::new(10, 10, 1, "maze"), 1))
        .await
        .expect("submit");
    wait_for_terminal(&harness.jobs, job_id).await;

    harness
        .store
        .backdate(job_id, harness.app.config.batch_job_ttl);

    assert_eq!(harness.app.sweep_expired().await.expect("sweep"), 1);
    assert!(harness.jobs.get(job_id).await.expect("get").is_none());
}
