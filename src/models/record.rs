use crate::database::DatabaseSettings;
use serde::{de::DeserializeOwned, Serialize};

/// Closed set of record types the service persists. Each kind owns exactly
/// one collection; adding a record type means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Course,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::User, RecordKind::Course];

    pub fn collection_name<'a>(&self, settings: &'a DatabaseSettings) -> &'a str {
        match self {
            RecordKind::User => &settings.users_collection_name,
            RecordKind::Course => &settings.courses_collection_name,
        }
    }
}

/// Ordering used by `fetch_top_ranked`. `field` is the persisted name the
/// database sorts on; `key` reads the same value from a decoded record.
pub struct Ranking<T> {
    pub field: &'static str,
    pub limit: usize,
    pub key: fn(&T) -> f64,
}

/// A document with a unique, mutable string identifier stored as `_id`.
pub trait Record: Serialize + DeserializeOwned + Clone + Unpin + Send + Sync + 'static {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Records without a ranking are returned unsorted and uncapped by
    /// `fetch_top_ranked`.
    fn ranking() -> Option<Ranking<Self>> {
        None
    }
}
