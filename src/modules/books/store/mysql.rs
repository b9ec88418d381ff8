use async_trait::async_trait;
use sqlx::{
    mysql::{MySql, MySqlArguments, MySqlPool},
    query::Query,
};

use super::{RelationalBookStore, StoreError};
use crate::modules::books::models::{BookInput, BookRow};

/// Idempotent DDL for the relational copy.
pub const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bookDetails (
  id INT AUTO_INCREMENT PRIMARY KEY,
  title VARCHAR(255) NOT NULL,
  authorId INT NOT NULL,
  rating DECIMAL(3,2) NOT NULL,
  ratingCount INT NOT NULL,
  reviewCount INT NOT NULL,
  description TEXT,
  pages INT,
  dateOfPublication DATE,
  editionalLanguage VARCHAR(255),
  price DECIMAL(10,2),
  onlineStore VARCHAR(255)
)"#;

// DECIMAL columns are read back as DOUBLE so they decode into f64.
const SELECT_ALL: &str = r#"
SELECT id, title, authorId, CAST(rating AS DOUBLE) AS rating, ratingCount, reviewCount,
       description, pages, dateOfPublication, editionalLanguage,
       CAST(price AS DOUBLE) AS price, onlineStore
FROM bookDetails"#;

const INSERT: &str = r#"
INSERT INTO bookDetails (title, authorId, rating, ratingCount, reviewCount, description, pages, dateOfPublication, editionalLanguage, price, onlineStore)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;

const UPDATE: &str = r#"
UPDATE bookDetails
SET title = ?, authorId = ?, rating = ?, ratingCount = ?, reviewCount = ?, description = ?, pages = ?, dateOfPublication = ?, editionalLanguage = ?, price = ?, onlineStore = ?
WHERE id = ?"#;

const DELETE: &str = "DELETE FROM bookDetails WHERE id = ?";

/// `bookDetails` table behind a shared MySQL pool.
#[derive(Clone)]
pub struct MySqlBookStore {
    pool: MySqlPool,
}

impl MySqlBookStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Bind the eleven book columns in table order.
fn bind_book<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    book: &'q BookInput,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.rating)
        .bind(book.rating_count)
        .bind(book.review_count)
        .bind(&book.description)
        .bind(book.pages)
        .bind(book.date_of_publication)
        .bind(&book.editional_language)
        .bind(book.price)
        .bind(&book.online_store)
}

#[async_trait]
impl RelationalBookStore for MySqlBookStore {
    async fn list(&self) -> Result<Vec<BookRow>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, book: &BookInput) -> Result<u64, StoreError> {
        let result = bind_book(sqlx::query(INSERT), book)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_id())
    }

    async fn update(&self, id: i64, book: &BookInput) -> Result<u64, StoreError> {
        let result = bind_book(sqlx::query(UPDATE), book)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(DELETE).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
