pub mod in_memory;
pub mod record_store;

pub use in_memory::InMemoryRecordStore;
pub use record_store::{MongoRecordStore, RecordStore};

use crate::models::{Course, User};
use crate::utils::StoreError;
use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection, Database};
use std::env;
use std::sync::Arc;
use std::time::Duration;

const NAMESPACE_EXISTS: i32 = 48;

/// Connection settings for the service database.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    pub connection_string: String,
    pub database_name: String,
    pub users_collection_name: String,
    pub courses_collection_name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            connection_string: "mongodb://localhost:27017".to_string(),
            database_name: "ishariu".to_string(),
            users_collection_name: "Users".to_string(),
            courses_collection_name: "Courses".to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            connection_string: env::var("MONGODB_URI").unwrap_or(defaults.connection_string),
            database_name: env::var("MONGODB_DATABASE").unwrap_or(defaults.database_name),
            users_collection_name: env::var("USERS_COLLECTION_NAME")
                .unwrap_or(defaults.users_collection_name),
            courses_collection_name: env::var("COURSES_COLLECTION_NAME")
                .unwrap_or(defaults.courses_collection_name),
        }
    }
}

/// Application-lifetime MongoDB handle. Cloning shares the driver pool.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let mut client_options =
            mongodb::options::ClientOptions::parse(&settings.connection_string).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("ishariu-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&settings.database_name);

        // Test connection
        db.list_collection_names().await?;

        log::info!("✅ Connected to MongoDB database: {}", settings.database_name);

        Ok(Self { db })
    }

    /// Creates `name` unless it already exists. Returns whether it was created.
    ///
    /// Another process may create the same collection between the check and
    /// the create; the server then answers NamespaceExists, which counts as
    /// already provisioned.
    pub async fn provision_collection(&self, name: &str) -> Result<bool, StoreError> {
        let existing = self
            .db
            .list_collection_names()
            .filter(doc! { "name": name })
            .await?;

        if !existing.is_empty() {
            log::debug!("Collection already exists: {}", name);
            return Ok(false);
        }

        match self.db.create_collection(name).await {
            Ok(()) => {
                log::info!("🔧 Created collection: {}", name);
                Ok(true)
            }
            Err(e) if is_namespace_exists(&e) => {
                log::debug!("Collection {} created concurrently", name);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(command) if command.code == NAMESPACE_EXISTS)
}

/// One store per record type, shared by every request handler.
#[derive(Clone)]
pub struct RecordStores {
    pub users: Arc<dyn RecordStore<User>>,
    pub courses: Arc<dyn RecordStore<Course>>,
    pub backend: &'static str,
}

impl RecordStores {
    pub async fn mongodb(db: &MongoDB, settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let users = MongoRecordStore::<User>::new(db, settings).await?;
        let courses = MongoRecordStore::<Course>::new(db, settings).await?;

        Ok(Self {
            users: Arc::new(users),
            courses: Arc::new(courses),
            backend: "mongodb",
        })
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRecordStore::<User>::new()),
            courses: Arc::new(InMemoryRecordStore::<Course>::new()),
            backend: "memory",
        }
    }
}
