// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running, with
//! FIRESTORE_EMULATOR_HOST pointing at it. They are skipped otherwise.

use food_ledger::db::{LogCursor, NutritionStore};
use food_ledger::models::{DailyGoal, FoodLogEntry, GoalSource, LogSource, NutrientVector};
use food_ledger::services::DailyGoalLedger;
use std::sync::Arc;

mod common;
use common::test_db;

const DAY: &str = "2026-03-01";
const NUM_CONCURRENT_COMMITS: usize = 8;

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

fn candidate(user_id: &str) -> DailyGoal {
    DailyGoal::new(
        user_id,
        DAY,
        NutrientVector::new(2000.0, 200.0, 140.0, 30.0, 70.0),
        GoalSource::Random,
        "2026-03-01T08:00:00.000Z",
    )
}

fn entry(user_id: &str, n: usize, calories: f64) -> FoodLogEntry {
    FoodLogEntry {
        entry_id: format!("{}-entry-{}", user_id, n),
        user_id: user_id.to_string(),
        date: DAY.to_string(),
        input: format!("snack {}", n),
        items: vec![],
        totals: NutrientVector::new(calories, 0.0, 0.0, 0.0, 0.0),
        source: LogSource::ExtractorText,
        image_url: None,
        logged_at: format!("2026-03-01T12:00:{:02}.000Z", n),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DAILY GOAL TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_goal_created_on_first_apply() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    assert!(db.read_goal(&user_id, DAY).await.unwrap().is_none());

    let state = db
        .apply_intake(candidate(&user_id), &NutrientVector::ZERO, None)
        .await
        .unwrap();
    assert_eq!(state.remaining, state.goal);

    let stored = db.read_goal(&user_id, DAY).await.unwrap().unwrap();
    assert_eq!(stored.goal, state.goal);
    assert_eq!(stored.source, GoalSource::Random);
}

#[tokio::test]
async fn test_existing_goal_is_never_rewritten() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    db.apply_intake(candidate(&user_id), &NutrientVector::ZERO, None)
        .await
        .unwrap();

    let mut other = candidate(&user_id);
    other.goal = NutrientVector::new(1800.0, 180.0, 120.0, 25.0, 60.0);
    other.remaining = other.goal;

    let state = db
        .apply_intake(other, &NutrientVector::new(100.0, 10.0, 5.0, 2.0, 3.0), None)
        .await
        .unwrap();

    assert_eq!(state.goal.calories, 2000.0);
    assert_eq!(
        state.remaining,
        NutrientVector::new(1900.0, 190.0, 135.0, 28.0, 67.0)
    );
}

#[tokio::test]
async fn test_commit_logs_and_deducts_once() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let e = entry(&user_id, 1, 250.0);

    let first = db
        .apply_intake(candidate(&user_id), &e.totals, Some(&e))
        .await
        .unwrap();
    let replay = db
        .apply_intake(candidate(&user_id), &e.totals, Some(&e))
        .await
        .unwrap();

    assert_eq!(first.remaining.calories, 1750.0);
    assert_eq!(replay, first);

    let logs = db.list_food_logs(&user_id, None, 10).await.unwrap();
    assert_eq!(logs, vec![e]);
}

#[tokio::test]
async fn test_concurrent_commits_are_not_lost() {
    require_emulator!();

    let db = Arc::new(test_db().await);
    let ledger = DailyGoalLedger::new(db.clone());
    let user_id = unique_user_id();

    let mut handles = vec![];
    for n in 0..NUM_CONCURRENT_COMMITS {
        let ledger = ledger.clone();
        let e = entry(&user_id, n, 10.0);
        handles.push(tokio::spawn(async move { ledger.commit(&e).await }));
    }

    let mut goals = vec![];
    for handle in handles {
        // Aborted commits are retried inside the transaction runner
        let state = handle
            .await
            .expect("Task join failed")
            .expect("Concurrent commit failed");
        goals.push(state.goal);
    }
    assert_eq!(goals.len(), NUM_CONCURRENT_COMMITS);
    assert!(goals.iter().all(|g| *g == goals[0]));

    let logged = db
        .list_food_logs(&user_id, None, 100)
        .await
        .unwrap()
        .len();
    assert_eq!(logged, NUM_CONCURRENT_COMMITS);

    let current = db.read_goal(&user_id, DAY).await.unwrap().unwrap();
    assert_eq!(
        current.goal.calories - current.remaining.calories,
        10.0 * NUM_CONCURRENT_COMMITS as f64
    );
}

#[tokio::test]
async fn test_replay_on_next_day_is_a_no_op() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let e = entry(&user_id, 1, 250.0);

    let first = db
        .apply_intake(candidate(&user_id), &e.totals, Some(&e))
        .await
        .unwrap();

    let mut retried = e.clone();
    retried.date = "2026-03-02".to_string();
    let mut next_day = candidate(&user_id);
    next_day.date = "2026-03-02".to_string();

    let replay = db
        .apply_intake(next_day, &retried.totals, Some(&retried))
        .await
        .unwrap();

    assert_eq!(replay, first);
    assert!(db.read_goal(&user_id, "2026-03-02").await.unwrap().is_none());

    // The stored entry keeps its original day
    let logs = db.list_food_logs(&user_id, None, 10).await.unwrap();
    assert_eq!(logs, vec![e]);
}

// ═══════════════════════════════════════════════════════════════════════════
// FOOD LOG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_food_logs_page_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    for n in 0..5 {
        let e = entry(&user_id, n, 1.0);
        db.apply_intake(candidate(&user_id), &e.totals, Some(&e))
            .await
            .unwrap();
    }

    let page = db.list_food_logs(&user_id, None, 3).await.unwrap();
    let ids: Vec<String> = page.iter().map(|e| e.entry_id.clone()).collect();
    assert_eq!(
        ids,
        vec![
            format!("{}-entry-4", user_id),
            format!("{}-entry-3", user_id),
            format!("{}-entry-2", user_id),
        ]
    );

    let cursor = LogCursor::after(&page[2]);
    let rest = db.list_food_logs(&user_id, Some(&cursor), 3).await.unwrap();
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].entry_id, format!("{}-entry-1", user_id));

    // Other users' entries never leak in
    let other = db.list_food_logs(&unique_user_id(), None, 10).await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_food_logs_page_through_identical_timestamps() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    let total = 25;

    for n in 0..total {
        let mut e = entry(&user_id, n, 1.0);
        e.entry_id = format!("{}-entry-{:02}", user_id, n);
        e.logged_at = "2026-03-01T12:00:00.000Z".to_string();
        db.apply_intake(candidate(&user_id), &e.totals, Some(&e))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor: Option<LogCursor> = None;
    loop {
        let page = db
            .list_food_logs(&user_id, cursor.as_ref(), 4)
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(LogCursor::after);
        seen.extend(page.into_iter().map(|e| e.entry_id));
    }

    let expected: Vec<String> = (0..total)
        .rev()
        .map(|n| format!("{}-entry-{:02}", user_id, n))
        .collect();
    assert_eq!(seen, expected);
}
