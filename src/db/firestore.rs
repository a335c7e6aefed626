// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Daily goals (per-user, per-day ledger rows)
//! - Food logs (append-only intake records)

use crate::db::{collections, goal_doc_id, LogCursor, NutritionStore};
use crate::error::AppError;
use crate::models::{DailyGoal, FoodLogEntry, GoalState, NutrientVector};
use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreQueryCursor, FirestoreQueryDirection, FirestoreTransaction};
use futures_util::FutureExt;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token; skip real credential discovery
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return `StoreUnavailable`.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::StoreUnavailable("Database not connected (offline mode)".to_string())
        })
    }
}

/// Result of one run of the intake transaction body.
enum Applied {
    Committed {
        state: GoalState,
        user_id: String,
        date: String,
        created: bool,
    },
    /// Entry was already logged; state of the day it was logged on
    Replayed(Option<GoalState>),
}

/// Transaction body for `apply_intake`.
///
/// `db` reads within the transaction. All reads happen before the writes
/// are queued. Read failures are permanent; only an aborted commit is
/// retried by the caller.
async fn apply_in_transaction(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    candidate: DailyGoal,
    totals: NutrientVector,
    entry: Option<FoodLogEntry>,
) -> Result<Applied, BackoffError<FirestoreError>> {
    // 1. Idempotency: an entry that is already logged was already deducted
    if let Some(entry) = entry.as_ref() {
        let logged: Option<FoodLogEntry> = db
            .fluent()
            .select()
            .by_id_in(collections::FOOD_LOGS)
            .obj()
            .one(&entry.entry_id)
            .await
            .map_err(BackoffError::permanent)?;

        if let Some(logged) = logged {
            let original: Option<DailyGoal> = db
                .fluent()
                .select()
                .by_id_in(collections::DAILY_GOALS)
                .obj()
                .one(&goal_doc_id(&logged.user_id, &logged.date))
                .await
                .map_err(BackoffError::permanent)?;

            tracing::debug!(
                user_id = %logged.user_id,
                date = %logged.date,
                entry_id = %logged.entry_id,
                "Food log entry already applied (idempotent skip)"
            );
            return Ok(Applied::Replayed(original.map(|goal| goal.state())));
        }
    }

    // 2. Read the ledger row, create-if-absent, then deduct
    let doc_id = goal_doc_id(&candidate.user_id, &candidate.date);
    let existing: Option<DailyGoal> = db
        .fluent()
        .select()
        .by_id_in(collections::DAILY_GOALS)
        .obj()
        .one(&doc_id)
        .await
        .map_err(BackoffError::permanent)?;

    let created = existing.is_none();
    let mut goal = existing.unwrap_or(candidate);
    let state = goal.apply(&totals);

    db.fluent()
        .update()
        .in_col(collections::DAILY_GOALS)
        .document_id(&doc_id)
        .object(&goal)
        .add_to_transaction(&mut *transaction)
        .map_err(BackoffError::permanent)?;

    // 3. Append the food log entry
    if let Some(entry) = entry.as_ref() {
        db.fluent()
            .update()
            .in_col(collections::FOOD_LOGS)
            .document_id(&entry.entry_id)
            .object(entry)
            .add_to_transaction(&mut *transaction)
            .map_err(BackoffError::permanent)?;
    }

    Ok(Applied::Committed {
        state,
        user_id: goal.user_id,
        date: goal.date,
        created,
    })
}

fn store_err(context: &str) -> impl Fn(firestore::errors::FirestoreError) -> AppError + '_ {
    move |e| AppError::StoreUnavailable(format!("{}: {}", context, e))
}

#[async_trait]
impl NutritionStore for FirestoreDb {
    // ─── Daily Goal Operations ───────────────────────────────────

    async fn read_goal(&self, user_id: &str, date: &str) -> Result<Option<DailyGoal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_GOALS)
            .obj()
            .one(&goal_doc_id(user_id, date))
            .await
            .map_err(store_err("Failed to read daily goal"))
    }

    /// Create-if-absent, deduct and log in one Firestore transaction.
    ///
    /// Runs under `run_transaction`, which re-runs the body when the commit
    /// is aborted by contention on the same ledger row. An entry that is
    /// already logged short-circuits before any write, whatever day the
    /// retry lands on.
    async fn apply_intake(
        &self,
        candidate: DailyGoal,
        totals: &NutrientVector,
        entry: Option<&FoodLogEntry>,
    ) -> Result<GoalState, AppError> {
        let client = self.get_client()?;
        let totals = *totals;
        let entry = entry.cloned();

        let outcome = client
            .run_transaction(|db, transaction| {
                let candidate = candidate.clone();
                let entry = entry.clone();
                async move {
                    apply_in_transaction(db, &mut *transaction, candidate, totals, entry).await
                }
                .boxed()
            })
            .await
            .map_err(store_err("Intake transaction failed"))?;

        match outcome {
            Applied::Committed {
                state,
                user_id,
                date,
                created,
            } => {
                tracing::info!(
                    user_id = %user_id,
                    date = %date,
                    created,
                    logged = entry.is_some(),
                    "Intake applied to daily goal"
                );
                Ok(state)
            }
            Applied::Replayed(Some(state)) => Ok(state),
            Applied::Replayed(None) => Err(AppError::Internal(anyhow::anyhow!(
                "Logged food entry has no ledger row"
            ))),
        }
    }

    // ─── Food Log Operations ─────────────────────────────────────

    async fn list_food_logs(
        &self,
        user_id: &str,
        cursor: Option<&LogCursor>,
        limit: u32,
    ) -> Result<Vec<FoodLogEntry>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FOOD_LOGS);

        let user_id = user_id.to_string();
        let query = query
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([
                ("logged_at", FirestoreQueryDirection::Descending),
                ("entry_id", FirestoreQueryDirection::Descending),
            ]);

        // Resume strictly after the last (logged_at, entry_id) pair served
        let query = match cursor {
            Some(cursor) => query.start_at(FirestoreQueryCursor::AfterValue(vec![
                cursor.logged_at.clone().into(),
                cursor.entry_id.clone().into(),
            ])),
            None => query,
        };

        let entries: Vec<FoodLogEntry> = query
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(store_err("Failed to query food logs"))?;

        Ok(entries)
    }
}
