use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId},
    error::ErrorKind,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::{DocumentBookStore, StoreError};
use crate::modules::books::models::{BookDocument, DocumentBook, Numeric};

/// Collection holding the document copy of the books.
pub const COLLECTION: &str = "books";

/// BSON layout of a stored book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    object_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_id: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating_count: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_count: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_publication: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    editional_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    online_store: Option<String>,
}

impl From<DocumentBook> for BookRecord {
    fn from(book: DocumentBook) -> Self {
        Self {
            object_id: None,
            id: book.id,
            title: book.title,
            author_id: book.author_id,
            rating: book.rating,
            rating_count: book.rating_count,
            review_count: book.review_count,
            description: book.description,
            pages: book.pages,
            date_of_publication: book
                .date_of_publication
                .map(|date| bson::DateTime::from_millis(date.timestamp_millis())),
            editional_language: book.editional_language,
            price: book.price,
            online_store: book.online_store,
        }
    }
}

impl From<BookRecord> for BookDocument {
    fn from(record: BookRecord) -> Self {
        Self {
            object_id: record
                .object_id
                .map(|object_id| object_id.to_hex())
                .unwrap_or_default(),
            book: DocumentBook {
                id: record.id,
                title: record.title,
                author_id: record.author_id,
                rating: record.rating,
                rating_count: record.rating_count,
                review_count: record.review_count,
                description: record.description,
                pages: record.pages,
                date_of_publication: record
                    .date_of_publication
                    .and_then(|date| DateTime::<Utc>::from_timestamp_millis(date.timestamp_millis())),
                editional_language: record.editional_language,
                price: record.price,
                online_store: record.online_store,
            },
        }
    }
}

/// Write errors and serialization failures are the client's fault; anything
/// else (network, auth, selection timeout) is a server error.
fn classify_insert_error(err: mongodb::error::Error) -> StoreError {
    match *err.kind {
        ErrorKind::Write(_) | ErrorKind::BsonSerialization(_) => {
            StoreError::Rejected(err.to_string())
        }
        _ => StoreError::Mongo(err),
    }
}

/// `books` collection behind the driver's pooled client.
#[derive(Clone)]
pub struct MongoBookStore {
    collection: Collection<BookRecord>,
}

impl MongoBookStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl DocumentBookStore for MongoBookStore {
    async fn list(&self) -> Result<Vec<BookDocument>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let records: Vec<BookRecord> = cursor.try_collect().await?;
        Ok(records.into_iter().map(BookDocument::from).collect())
    }

    async fn insert(&self, book: DocumentBook) -> Result<BookDocument, StoreError> {
        let mut record = BookRecord::from(book);
        record.object_id = Some(ObjectId::new());

        self.collection
            .insert_one(&record)
            .await
            .map_err(classify_insert_error)?;

        Ok(record.into())
    }
}
