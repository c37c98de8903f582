// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations on the activities collection.
//!
//! Every activity is stored under its Strava ID as the document ID, so the
//! external identifier is unique by construction. Writes that must fail on
//! a missing or existing document rely on Firestore create semantics and
//! `Exists` preconditions, which are checked atomically server-side.

use crate::db::collections;
use crate::error::AppError;
use crate::models::ActivityDocument;
use firestore::errors::FirestoreError;
use firestore::{FirestoreQueryDirection, FirestoreWritePrecondition};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    collection: String,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token, so skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            collection: collections::ACTIVITIES.to_string(),
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
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            collection: collections::ACTIVITIES.to_string(),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            collection: collections::ACTIVITIES.to_string(),
        }
    }

    /// Use a different collection for activities (staging, tests).
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// One-time startup check. Safe to call repeatedly.
    ///
    /// Uniqueness of the Strava ID needs no index: it is the document ID.
    /// This only proves the collection is reachable.
    pub async fn initialize(&self) -> Result<(), AppError> {
        self.list_activities(0, Some(1)).await?;
        tracing::info!(collection = %self.collection, "Database initialized");
        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Insert or fully replace an activity.
    pub async fn upsert_activity(&self, activity: &ActivityDocument) -> Result<(), AppError> {
        let _: ActivityDocument = self
            .get_client()?
            .fluent()
            .update()
            .in_col(self.collection.as_str())
            .document_id(ActivityDocument::document_id(activity.id))
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get an activity by Strava ID.
    pub async fn get_activity(
        &self,
        activity_id: u64,
    ) -> Result<Option<ActivityDocument>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(self.collection.as_str())
            .obj()
            .one(&ActivityDocument::document_id(activity_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List activities ordered by Strava ID. `limit = None` returns everything
    /// after `offset`.
    pub async fn list_activities(
        &self,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<Vec<ActivityDocument>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(self.collection.as_str())
            .order_by([("id", FirestoreQueryDirection::Ascending)])
            .offset(offset);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new activity, failing with `Conflict` if the ID is taken.
    pub async fn create_activity(
        &self,
        activity: &ActivityDocument,
    ) -> Result<ActivityDocument, AppError> {
        self.get_client()?
            .fluent()
            .insert()
            .into(self.collection.as_str())
            .document_id(ActivityDocument::document_id(activity.id))
            .object(activity)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => AppError::Conflict(format!(
                    "Activity with ID {} already exists",
                    activity.id
                )),
                e => AppError::Database(e.to_string()),
            })
    }

    /// Replace an existing activity, failing with `NotFound` if absent.
    pub async fn replace_activity(
        &self,
        activity_id: u64,
        activity: &ActivityDocument,
    ) -> Result<ActivityDocument, AppError> {
        self.get_client()?
            .fluent()
            .update()
            .in_col(self.collection.as_str())
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(ActivityDocument::document_id(activity_id))
            .object(activity)
            .execute()
            .await
            .map_err(|e| not_found_or_database(e, activity_id))
    }

    /// Delete an activity, failing with `NotFound` if absent.
    pub async fn delete_activity(&self, activity_id: u64) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(self.collection.as_str())
            .document_id(ActivityDocument::document_id(activity_id))
            .precondition(FirestoreWritePrecondition::Exists(true))
            .execute()
            .await
            .map_err(|e| not_found_or_database(e, activity_id))?;
        Ok(())
    }
}

/// A failed `Exists(true)` precondition comes back as NOT_FOUND.
fn not_found_or_database(e: FirestoreError, activity_id: u64) -> AppError {
    match e {
        FirestoreError::DataNotFoundError(_) => {
            AppError::NotFound(format!("Activity {} not found", activity_id))
        }
        e => AppError::Database(e.to_string()),
    }
}
