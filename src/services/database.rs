use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};

use crate::error::ApiError;
use crate::models::{Course, Layout, Notification, Order, User};

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, ApiError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            ApiError::Database(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Email uniqueness is an invariant enforced at the index level as well;
    /// the pre-write existence checks only give friendlier errors.
    pub async fn initialize_indexes(&self) -> Result<(), ApiError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users().create_index(email_index, None).await?;

        let order_user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("order_user_idx".to_string())
                    .build(),
            )
            .build();
        self.orders().create_index(order_user_index, None).await?;

        let notification_sweep_index = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("notification_sweep_idx".to_string())
                    .build(),
            )
            .build();
        self.notifications()
            .create_index(notification_sweep_index, None)
            .await?;

        let layout_kind_index = IndexModel::builder()
            .keys(doc! { "kind": 1 })
            .options(
                IndexOptions::builder()
                    .name("layout_kind_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.layouts().create_index(layout_kind_index, None).await?;

        tracing::info!("MongoDB indexes created");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), ApiError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                ApiError::Database(e)
            })?;
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn courses(&self) -> Collection<Course> {
        self.db.collection("courses")
    }

    pub fn orders(&self) -> Collection<Order> {
        self.db.collection("orders")
    }

    pub fn notifications(&self) -> Collection<Notification> {
        self.db.collection("notifications")
    }

    pub fn layouts(&self) -> Collection<Layout> {
        self.db.collection("layouts")
    }

    // ==================== Users ====================

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users()
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.users().find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    // ==================== Courses ====================

    pub async fn find_course_by_id(&self, id: &str) -> Result<Option<Course>, ApiError> {
        Ok(self.courses().find_one(doc! { "_id": id }, None).await?)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.courses().find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    // ==================== Orders ====================

    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.orders().find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    // ==================== Notifications ====================

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.notifications().find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Delete read notifications older than the cutoff; returns the count.
    pub async fn delete_read_notifications_before(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, ApiError> {
        let result = self
            .notifications()
            .delete_many(
                doc! {
                    "status": "read",
                    "created_at": { "$lt": mongodb::bson::DateTime::from_chrono(cutoff) },
                },
                None,
            )
            .await?;
        Ok(result.deleted_count)
    }

    // ==================== Layouts ====================

    pub async fn find_layout_by_kind(&self, kind: &str) -> Result<Option<Layout>, ApiError> {
        Ok(self.layouts().find_one(doc! { "kind": kind }, None).await?)
    }
}
