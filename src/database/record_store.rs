use super::{DatabaseSettings, MongoDB};
use crate::models::{Record, RecordKind};
use crate::utils::StoreError;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;

/// Maximum number of records `fetch_by_filter` returns.
pub const FILTER_LIMIT: usize = 10;

/// Result of a replace or delete. A mutation that matched no document is
/// still a success; callers that care check `matched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    pub matched: u64,
}

impl MutationOutcome {
    pub fn is_noop(&self) -> bool {
        self.matched == 0
    }
}

/// Uniform CRUD over the collection that backs one record type.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>, StoreError>;

    async fn fetch_by_id(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// At most `FILTER_LIMIT` records matching `filter`.
    async fn fetch_by_filter(&self, filter: Document) -> Result<Vec<T>, StoreError>;

    /// Assigns a fresh identifier when the record has none, then inserts it
    /// as a new document. Returns the identifier it was stored under.
    async fn insert(&self, record: &mut T) -> Result<String, StoreError>;

    async fn replace(&self, record: &T) -> Result<MutationOutcome, StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<MutationOutcome, StoreError>;

    /// Top records by the type's ranking. Types without a ranking get
    /// exactly what `fetch_all` returns: no sorting and no cap.
    async fn fetch_top_ranked(&self) -> Result<Vec<T>, StoreError>;
}

pub(crate) fn assign_id_if_missing<T: Record>(record: &mut T) -> String {
    if record.id().is_empty() {
        record.set_id(ObjectId::new().to_hex());
    }
    record.id().to_string()
}

pub struct MongoRecordStore<T: Record> {
    collection: Collection<T>,
}

impl<T: Record> MongoRecordStore<T> {
    /// Binds a store to `T`'s collection. Every known collection is
    /// provisioned, not only the bound one.
    pub async fn new(db: &MongoDB, settings: &DatabaseSettings) -> Result<Self, StoreError> {
        for kind in RecordKind::ALL {
            db.provision_collection(kind.collection_name(settings)).await?;
        }

        let name = T::KIND.collection_name(settings);
        log::info!("📦 Record store for {:?} bound to collection {}", T::KIND, name);

        Ok(Self {
            collection: db.collection::<T>(name),
        })
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MongoRecordStore<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn fetch_by_filter(&self, filter: Document) -> Result<Vec<T>, StoreError> {
        let cursor = self
            .collection
            .find(filter)
            .limit(FILTER_LIMIT as i64)
            .await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }

    async fn insert(&self, record: &mut T) -> Result<String, StoreError> {
        let id = assign_id_if_missing(record);
        self.collection.insert_one(&*record).await?;
        log::debug!("Inserted {:?} {}", T::KIND, id);
        Ok(id)
    }

    async fn replace(&self, record: &T) -> Result<MutationOutcome, StoreError> {
        if record.id().is_empty() {
            return Err(StoreError::MissingIdentifier);
        }

        let result = self
            .collection
            .replace_one(doc! { "_id": record.id() }, record)
            .await?;

        Ok(MutationOutcome {
            matched: result.matched_count,
        })
    }

    async fn delete_by_id(&self, id: &str) -> Result<MutationOutcome, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(MutationOutcome {
            matched: result.deleted_count,
        })
    }

    async fn fetch_top_ranked(&self) -> Result<Vec<T>, StoreError> {
        let Some(ranking) = T::ranking() else {
            return self.fetch_all().await;
        };

        let mut sort = Document::new();
        sort.insert(ranking.field, -1);

        let cursor = self
            .collection
            .find(doc! {})
            .sort(sort)
            .limit(ranking.limit as i64)
            .await?;
        Ok(cursor.try_collect::<Vec<T>>().await?)
    }
}
