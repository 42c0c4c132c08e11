//! InMemoryRecordStore - process-local record store for tests and local runs.

use super::record_store::{assign_id_if_missing, MutationOutcome, RecordStore, FILTER_LIMIT};
use crate::models::Record;
use crate::utils::StoreError;
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

/// Records are kept as BSON documents in insertion order, the same shape
/// the MongoDB store persists. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryRecordStore<T: Record> {
    documents: Arc<RwLock<Vec<Document>>>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> InMemoryRecordStore<T> {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            _record: PhantomData,
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::Database("lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Database("lock poisoned".into()))
    }

    fn decode_all<'a>(documents: impl Iterator<Item = &'a Document>) -> Result<Vec<T>, StoreError> {
        documents
            .map(|document| bson::from_document::<T>(document.clone()).map_err(StoreError::from))
            .collect()
    }
}

fn has_id(document: &Document, id: &str) -> bool {
    matches!(document.get("_id"), Some(Bson::String(stored)) if stored == id)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

fn values_equal(stored: &Bson, wanted: &Bson) -> bool {
    match (as_number(stored), as_number(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => stored == wanted,
    }
}

/// Top-level equality in the spirit of a MongoDB query: numbers compare by
/// value and an array field matches when any element equals the value.
fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, wanted)| match document.get(key) {
        Some(Bson::Array(items)) if !matches!(wanted, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, wanted))
        }
        Some(stored) => values_equal(stored, wanted),
        None => matches!(wanted, Bson::Null),
    })
}

fn validate_filter(filter: &Document) -> Result<(), StoreError> {
    for (key, value) in filter {
        if key.starts_with('$') {
            return Err(StoreError::InvalidFilter(format!("unsupported operator {}", key)));
        }
        if let Bson::Document(inner) = value {
            if let Some(op) = inner.keys().find(|k| k.starts_with('$')) {
                return Err(StoreError::InvalidFilter(format!(
                    "unsupported operator {} on {}",
                    op, key
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, StoreError> {
        Self::decode_all(self.read()?.iter())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        let documents = self.read()?;
        match documents.iter().find(|document| has_id(document, id)) {
            Some(document) => Ok(Some(bson::from_document(document.clone())?)),
            None => Ok(None),
        }
    }

    async fn fetch_by_filter(&self, filter: Document) -> Result<Vec<T>, StoreError> {
        validate_filter(&filter)?;
        let documents = self.read()?;
        Self::decode_all(
            documents
                .iter()
                .filter(|document| matches_filter(document, &filter))
                .take(FILTER_LIMIT),
        )
    }

    async fn insert(&self, record: &mut T) -> Result<String, StoreError> {
        let id = assign_id_if_missing(record);
        let document = bson::to_document(&*record)?;

        let mut documents = self.write()?;
        if documents.iter().any(|existing| has_id(existing, &id)) {
            return Err(StoreError::DuplicateIdentifier(id));
        }
        documents.push(document);

        Ok(id)
    }

    async fn replace(&self, record: &T) -> Result<MutationOutcome, StoreError> {
        if record.id().is_empty() {
            return Err(StoreError::MissingIdentifier);
        }
        let document = bson::to_document(record)?;

        let mut documents = self.write()?;
        match documents.iter_mut().find(|existing| has_id(existing, record.id())) {
            Some(existing) => {
                *existing = document;
                Ok(MutationOutcome { matched: 1 })
            }
            None => Ok(MutationOutcome { matched: 0 }),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<MutationOutcome, StoreError> {
        let mut documents = self.write()?;
        match documents.iter().position(|document| has_id(document, id)) {
            Some(index) => {
                documents.remove(index);
                Ok(MutationOutcome { matched: 1 })
            }
            None => Ok(MutationOutcome { matched: 0 }),
        }
    }

    async fn fetch_top_ranked(&self) -> Result<Vec<T>, StoreError> {
        let mut records = self.fetch_all().await?;

        if let Some(ranking) = T::ranking() {
            records.sort_by(|a, b| (ranking.key)(b).total_cmp(&(ranking.key)(a)));
            records.truncate(ranking.limit);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, User};
    use mongodb::bson::doc;

    fn course(title: &str, category: &str, revenue: f64) -> Course {
        Course {
            id: String::new(),
            title: title.to_string(),
            description: format!("About {}", title),
            category: category.to_string(),
            author_id: "author-1".to_string(),
            price: 20.0,
            revenue_generated: revenue,
            enrolled_students: 0,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    fn user(username: &str) -> User {
        User {
            id: String::new(),
            username: username.to_string(),
            password: "hash".to_string(),
            email: format!("{}@example.com", username),
            role: "User".to_string(),
            profile_color: "#336699".to_string(),
            allow_access_to_age_restricted_content: true,
            use_data_to_improve_ishariu: false,
            created_courses: vec!["c-1".to_string()],
            enrolled_courses: vec!["c-2".to_string(), "c-3".to_string()],
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_fetch_returns_same_record() {
        let store = InMemoryRecordStore::<User>::new();
        let original = user("ana");

        let mut record = original.clone();
        let id = store.insert(&mut record).await.unwrap();

        assert_eq!(id.len(), 24);
        assert_eq!(record.id, id);

        let fetched = store.fetch_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched, User { id: id.clone(), ..original });
    }

    #[tokio::test]
    async fn insert_keeps_preset_id_and_rejects_duplicates() {
        let store = InMemoryRecordStore::<User>::new();
        let mut record = user("ana");
        record.id = "fixed".to_string();

        assert_eq!(store.insert(&mut record).await.unwrap(), "fixed");

        let err = store.insert(&mut record.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentifier(id) if id == "fixed"));
    }

    #[tokio::test]
    async fn fetch_all_on_empty_store_is_empty() {
        let store = InMemoryRecordStore::<Course>::new();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filter_caps_results_at_ten() {
        let store = InMemoryRecordStore::<Course>::new();
        for i in 0..15 {
            store
                .insert(&mut course(&format!("Course {}", i), "music", 0.0))
                .await
                .unwrap();
        }
        store.insert(&mut course("Other", "art", 0.0)).await.unwrap();

        let found = store
            .fetch_by_filter(doc! { "Category": "music" })
            .await
            .unwrap();
        assert_eq!(found.len(), FILTER_LIMIT);
        assert!(found.iter().all(|c| c.category == "music"));

        let art = store.fetch_by_filter(doc! { "Category": "art" }).await.unwrap();
        assert_eq!(art.len(), 1);
    }

    #[tokio::test]
    async fn filter_matches_array_members_and_numbers_by_value() {
        let users = InMemoryRecordStore::<User>::new();
        users.insert(&mut user("ana")).await.unwrap();

        let enrolled = users
            .fetch_by_filter(doc! { "EnrolledCourses": "c-3" })
            .await
            .unwrap();
        assert_eq!(enrolled.len(), 1);

        let courses = InMemoryRecordStore::<Course>::new();
        courses.insert(&mut course("Piano", "music", 0.0)).await.unwrap();
        let priced = courses.fetch_by_filter(doc! { "Price": 20 }).await.unwrap();
        assert_eq!(priced.len(), 1);
    }

    #[tokio::test]
    async fn operator_filters_are_rejected() {
        let store = InMemoryRecordStore::<Course>::new();

        let err = store
            .fetch_by_filter(doc! { "$or": [{ "Category": "art" }] })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter(_)));

        let err = store
            .fetch_by_filter(doc! { "Price": { "$gt": 5 } })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn best_sellers_are_top_three_by_revenue() {
        let store = InMemoryRecordStore::<Course>::new();
        for (title, revenue) in [("a", 100.0), ("b", 500.0), ("c", 10.0)] {
            store.insert(&mut course(title, "music", revenue)).await.unwrap();
        }

        let ranked: Vec<f64> = store
            .fetch_top_ranked()
            .await
            .unwrap()
            .iter()
            .map(|c| c.revenue_generated)
            .collect();
        assert_eq!(ranked, vec![500.0, 100.0, 10.0]);

        store.insert(&mut course("d", "music", 250.0)).await.unwrap();
        store.insert(&mut course("e", "music", 1.0)).await.unwrap();
        let ranked: Vec<f64> = store
            .fetch_top_ranked()
            .await
            .unwrap()
            .iter()
            .map(|c| c.revenue_generated)
            .collect();
        assert_eq!(ranked, vec![500.0, 250.0, 100.0]);
    }

    #[tokio::test]
    async fn top_ranked_without_ranking_is_fetch_all() {
        let store = InMemoryRecordStore::<User>::new();
        for name in ["u1", "u2", "u3", "u4", "u5"] {
            store.insert(&mut user(name)).await.unwrap();
        }

        let all = store.fetch_all().await.unwrap();
        let ranked = store.fetch_top_ranked().await.unwrap();
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked, all);
    }

    #[tokio::test]
    async fn replace_overwrites_whole_document() {
        let store = InMemoryRecordStore::<User>::new();
        let mut record = user("ana");
        let id = store.insert(&mut record).await.unwrap();

        record.email = "new@example.com".to_string();
        record.enrolled_courses.clear();
        let outcome = store.replace(&record).await.unwrap();
        assert_eq!(outcome, MutationOutcome { matched: 1 });

        let stored = store.fetch_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.email, "new@example.com");
        assert!(stored.enrolled_courses.is_empty());
    }

    #[tokio::test]
    async fn replace_of_unknown_id_is_noop() {
        let store = InMemoryRecordStore::<User>::new();
        store.insert(&mut user("ana")).await.unwrap();

        let mut ghost = user("ghost");
        ghost.id = "does-not-exist".to_string();
        let outcome = store.replace(&ghost).await.unwrap();

        assert!(outcome.is_noop());
        assert_eq!(store.fetch_all().await.unwrap().len(), 1);
        assert!(store.fetch_by_id("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_without_id_is_rejected() {
        let store = InMemoryRecordStore::<User>::new();
        let err = store.replace(&user("ana")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingIdentifier));
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_noop() {
        let store = InMemoryRecordStore::<Course>::new();
        let outcome = store.delete_by_id("never-inserted").await.unwrap();

        assert!(outcome.is_noop());
        assert!(store.fetch_by_id("never-inserted").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryRecordStore::<Course>::new();
        let id = store.insert(&mut course("a", "music", 1.0)).await.unwrap();

        assert_eq!(store.delete_by_id(&id).await.unwrap().matched, 1);
        assert!(store.fetch_by_id(&id).await.unwrap().is_none());
        assert!(store.fetch_all().await.unwrap().is_empty());
    }
}
