//! Driver-backed stores against real servers.
//!
//! Skipped unless `BOOKSTORE_TEST_MYSQL_URL` / `BOOKSTORE_TEST_MONGODB_URI`
//! point at disposable databases.

use bookstore_app::modules::books::{
    models::{BookInput, DocumentBook},
    store::{
        mysql::CREATE_TABLE, DocumentBookStore, MongoBookStore, MySqlBookStore,
        RelationalBookStore,
    },
};
use chrono::NaiveDate;
use sqlx::mysql::MySqlPoolOptions;

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn dune(title: &str) -> BookInput {
    BookInput {
        title: Some(title.to_string()),
        author_id: Some(1),
        rating: Some(4.8),
        rating_count: Some(100),
        review_count: Some(50),
        description: Some("Spice".into()),
        pages: Some(412),
        date_of_publication: NaiveDate::from_ymd_opt(1965, 8, 1),
        editional_language: Some("English".into()),
        price: Some(9.99),
        online_store: None,
    }
}

#[tokio::test]
async fn mysql_store_crud_cycle() {
    let Some(url) = env("BOOKSTORE_TEST_MYSQL_URL") else {
        eprintln!("BOOKSTORE_TEST_MYSQL_URL not set; skipping");
        return;
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .unwrap();
    sqlx::raw_sql(CREATE_TABLE).execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM bookDetails")
        .execute(&pool)
        .await
        .unwrap();

    let store = MySqlBookStore::new(pool.clone());
    assert!(store.list().await.unwrap().is_empty());

    let id = store.insert(&dune("Dune")).await.unwrap();
    let rows = store.list().await.unwrap();
    assert_eq!(rows, vec![dune("Dune").into_row(id as i32).unwrap()]);

    // Rewriting identical values still counts as a match.
    assert_eq!(store.update(id as i64, &dune("Dune")).await.unwrap(), 1);
    assert_eq!(store.update(id as i64, &dune("Dune Messiah")).await.unwrap(), 1);
    assert_eq!(store.list().await.unwrap()[0].title, "Dune Messiah");
    assert_eq!(store.update(id as i64 + 1000, &dune("x")).await.unwrap(), 0);

    assert_eq!(store.delete(id as i64).await.unwrap(), 1);
    assert_eq!(store.delete(id as i64).await.unwrap(), 0);
    assert!(store.list().await.unwrap().is_empty());

    let inserts = (0..8).map(|n| {
        let store = store.clone();
        tokio::spawn(async move { store.insert(&dune(&format!("Dune {n}"))).await })
    });
    let mut ids = Vec::new();
    for task in inserts {
        ids.push(task.await.unwrap().unwrap());
    }
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
    assert!(sorted.iter().all(|id| *id > rows[0].id as u64));

    // Ids keep increasing past everything committed before.
    let later = store.insert(&dune("Dune Later")).await.unwrap();
    assert!(later > *sorted.last().unwrap());

    let missing_author = BookInput {
        author_id: None,
        ..dune("Dune Anonymous")
    };
    let err = store.insert(&missing_author).await.unwrap_err();
    assert!(err.to_string().contains("authorId"));

    sqlx::query("DELETE FROM bookDetails")
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn mongo_store_insert_then_list() {
    let Some(uri) = env("BOOKSTORE_TEST_MONGODB_URI") else {
        eprintln!("BOOKSTORE_TEST_MONGODB_URI not set; skipping");
        return;
    };

    let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
    let database = client.database("bookstore_test");
    database.drop().await.unwrap();

    let store = MongoBookStore::new(&database);
    assert!(store.list().await.unwrap().is_empty());

    let book: DocumentBook = serde_json::from_value(serde_json::json!({
        "id": 7,
        "title": "Dune",
        "rating": 4.8,
        "dateOfPublication": "1965-08-01"
    }))
    .unwrap();
    let saved = store.insert(book.clone()).await.unwrap();
    assert_eq!(saved.book, book);

    let fractional: DocumentBook =
        serde_json::from_value(serde_json::json!({ "title": "Dune", "pages": 412.5 })).unwrap();
    let fractional = store.insert(fractional).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![saved, fractional]);

    database.drop().await.unwrap();
}
