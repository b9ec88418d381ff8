use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A row of the relational `bookDetails` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct BookRow {
    /// Auto-increment identifier assigned by MySQL
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub rating: f64,
    pub rating_count: i32,
    pub review_count: i32,
    pub description: Option<String>,
    pub pages: Option<i32>,
    pub date_of_publication: Option<NaiveDate>,
    pub editional_language: Option<String>,
    pub price: Option<f64>,
    pub online_store: Option<String>,
}

/// Request body for relational insert and update.
///
/// Every field is optional so a missing `NOT NULL` column reaches MySQL and
/// comes back as its own error. A client-supplied `id` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_id: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<i32>,
    #[serde(default)]
    pub review_count: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub date_of_publication: Option<NaiveDate>,
    #[serde(default)]
    pub editional_language: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub online_store: Option<String>,
}

impl BookInput {
    /// Pair the input with a store-assigned identifier. Fails with MySQL's
    /// wording when a `NOT NULL` column is missing.
    pub fn into_row(self, id: i32) -> Result<BookRow, String> {
        fn required<T>(value: Option<T>, column: &str) -> Result<T, String> {
            value.ok_or_else(|| format!("Column '{column}' cannot be null"))
        }

        Ok(BookRow {
            id,
            title: required(self.title, "title")?,
            author_id: required(self.author_id, "authorId")?,
            rating: required(self.rating, "rating")?,
            rating_count: required(self.rating_count, "ratingCount")?,
            review_count: required(self.review_count, "reviewCount")?,
            description: self.description,
            pages: self.pages,
            date_of_publication: self.date_of_publication,
            editional_language: self.editional_language,
            price: self.price,
            online_store: self.online_store,
        })
    }
}

/// A numeric document field. Integers stay integers on the way back out;
/// anything with a fractional part is kept as a double.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Double(f64),
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Int(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Double(value)
    }
}

/// Book fields as held by the document store. Every field is optional and
/// absent fields are not written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBook {
    /// Client-supplied numeric id; not unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Numeric>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "publication_date::deserialize"
    )]
    pub date_of_publication: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editional_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_store: Option<String>,
}

/// A stored document together with its generated identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDocument {
    /// Hex-encoded ObjectId
    #[serde(rename = "_id")]
    pub object_id: String,
    #[serde(flatten)]
    pub book: DocumentBook,
}

/// Response body for a successful relational insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreated {
    pub message: String,
    pub book_id: u64,
}

/// Accepts either a calendar date (`2021-06-01`) or an RFC 3339 timestamp.
mod publication_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc()));
        }

        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| D::Error::custom(format!("invalid date '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn book_input_accepts_missing_not_null_columns() {
        let input: BookInput = serde_json::from_value(json!({
            "authorId": 1,
            "rating": 4.8,
            "ratingCount": 100,
            "reviewCount": 50
        }))
        .unwrap();
        assert_eq!(input.title, None);
        assert_eq!(
            input.into_row(1).unwrap_err(),
            "Column 'title' cannot be null"
        );
    }

    #[test]
    fn book_input_defaults_optional_columns() {
        let input: BookInput = serde_json::from_value(json!({
            "title": "Dune",
            "authorId": 1,
            "rating": 4.8,
            "ratingCount": 100,
            "reviewCount": 50
        }))
        .unwrap();
        assert_eq!(input.pages, None);
        assert_eq!(input.date_of_publication, None);
    }

    #[test]
    fn book_row_serializes_with_legacy_field_names() {
        let row = BookInput {
            title: Some("Dune".into()),
            author_id: Some(1),
            rating: Some(4.8),
            rating_count: Some(100),
            review_count: Some(50),
            pages: Some(412),
            date_of_publication: NaiveDate::from_ymd_opt(1965, 8, 1),
            editional_language: Some("English".into()),
            price: Some(9.99),
            ..BookInput::default()
        }
        .into_row(1)
        .unwrap();

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["authorId"], 1);
        assert_eq!(value["dateOfPublication"], "1965-08-01");
        assert_eq!(value["editionalLanguage"], "English");
        assert!(value["onlineStore"].is_null());
    }

    #[test]
    fn document_book_accepts_plain_dates_and_timestamps() {
        let plain: DocumentBook =
            serde_json::from_value(json!({ "dateOfPublication": "2021-06-01" })).unwrap();
        let stamped: DocumentBook =
            serde_json::from_value(json!({ "dateOfPublication": "2021-06-01T00:00:00Z" }))
                .unwrap();
        assert_eq!(plain.date_of_publication, stamped.date_of_publication);
    }

    #[test]
    fn document_book_rejects_wrong_numeric_type() {
        let result = serde_json::from_value::<DocumentBook>(json!({ "pages": "many" }));
        assert!(result.is_err());
    }

    #[test]
    fn document_book_keeps_fractional_and_integral_numbers() {
        let book: DocumentBook =
            serde_json::from_value(json!({ "pages": 412.5, "ratingCount": 100 })).unwrap();
        assert_eq!(book.pages, Some(Numeric::Double(412.5)));
        assert_eq!(book.rating_count, Some(Numeric::Int(100)));
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({ "pages": 412.5, "ratingCount": 100 })
        );
    }

    #[test]
    fn document_book_drops_unknown_fields() {
        let book: DocumentBook =
            serde_json::from_value(json!({ "title": "Dune", "isbn": "0441013597" })).unwrap();
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value, json!({ "title": "Dune" }));
    }

    #[test]
    fn book_document_flattens_fields_beside_object_id() {
        let document = BookDocument {
            object_id: "65f0c0ffee0000000000abcd".into(),
            book: DocumentBook {
                id: Some(Numeric::Int(7)),
                title: Some("Dune".into()),
                ..DocumentBook::default()
            },
        };
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({ "_id": "65f0c0ffee0000000000abcd", "id": 7, "title": "Dune" })
        );
    }
}
