pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, put},
    Router,
};
use bookstore_db::Databases;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use handlers::BooksState;
use store::{MongoBookStore, MySqlBookStore};

/// Book CRUD over the document store (`/mongodb`) and the relational store (`/mysql`)
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

/// Build the books router over the given stores.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/mongodb",
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route(
            "/mysql",
            get(handlers::list_rows).post(handlers::create_row),
        )
        .route(
            "/mysql/{id}",
            put(handlers::update_row).delete(handlers::delete_row),
        )
        .with_state(state)
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            mongo_database = %ctx.db.mongo.name(),
            collection = store::mongo::COLLECTION,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_book_details",
            up: store::mysql::CREATE_TABLE,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over driver-backed stores
pub fn create_module(db: &Databases) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(BooksState {
        documents: Arc::new(MongoBookStore::new(&db.mongo)),
        rows: Arc::new(MySqlBookStore::new(db.mysql.clone())),
    }))
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": schema
            }
        }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn json_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn id_parameter() -> serde_json::Value {
    json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    }])
}

fn openapi_fragment() -> serde_json::Value {
    let message = json!({ "$ref": "#/components/schemas/Message" });

    json!({
        "paths": {
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            },
            "/mongodb": {
                "get": {
                    "summary": "List book documents",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Book documents in storage order", json!({
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/BookDocument" }
                        })),
                        "500": error_response("Document store failure")
                    }
                },
                "post": {
                    "summary": "Insert a book document",
                    "tags": ["Books"],
                    "requestBody": json_body("DocumentBook"),
                    "responses": {
                        "201": json_response("Saved document", json!({ "$ref": "#/components/schemas/BookDocument" })),
                        "400": error_response("Malformed document"),
                        "500": error_response("Document store failure")
                    }
                }
            },
            "/mysql": {
                "get": {
                    "summary": "List book rows",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All rows of bookDetails", json!({
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/BookRow" }
                        })),
                        "500": error_response("Query failure")
                    }
                },
                "post": {
                    "summary": "Insert a book row",
                    "tags": ["Books"],
                    "requestBody": json_body("BookInput"),
                    "responses": {
                        "201": json_response("Row inserted", json!({ "$ref": "#/components/schemas/BookCreated" })),
                        "500": error_response("Query failure, including a missing NOT NULL column")
                    }
                }
            },
            "/mysql/{id}": {
                "put": {
                    "summary": "Update a book row",
                    "tags": ["Books"],
                    "parameters": id_parameter(),
                    "requestBody": json_body("BookInput"),
                    "responses": {
                        "200": json_response("Row updated", message.clone()),
                        "400": error_response("Malformed id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Query failure, including a missing NOT NULL column")
                    }
                },
                "delete": {
                    "summary": "Delete a book row",
                    "tags": ["Books"],
                    "parameters": id_parameter(),
                    "responses": {
                        "200": json_response("Row deleted", message),
                        "400": error_response("Malformed id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Query failure")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Message": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                },
                "BookCreated": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "bookId": { "type": "integer", "format": "int64" }
                    },
                    "required": ["message", "bookId"]
                },
                "BookInput": {
                    "type": "object",
                    "description": "title, authorId, rating, ratingCount and reviewCount are NOT NULL columns",
                    "properties": book_properties(false, "integer")
                },
                "BookRow": {
                    "type": "object",
                    "properties": book_properties(true, "integer"),
                    "required": ["id", "title", "authorId", "rating", "ratingCount", "reviewCount"]
                },
                "DocumentBook": {
                    "type": "object",
                    "properties": book_properties(true, "number")
                },
                "BookDocument": {
                    "allOf": [
                        { "$ref": "#/components/schemas/DocumentBook" },
                        {
                            "type": "object",
                            "properties": {
                                "_id": { "type": "string", "description": "Generated ObjectId" }
                            },
                            "required": ["_id"]
                        }
                    ]
                }
            }
        }
    })
}

/// `whole` is the JSON type of the count-like fields: `integer` for the
/// relational columns, `number` for the document fields.
fn book_properties(with_id: bool, whole: &str) -> serde_json::Value {
    let mut properties = json!({
        "title": { "type": "string" },
        "authorId": { "type": whole },
        "rating": { "type": "number" },
        "ratingCount": { "type": whole },
        "reviewCount": { "type": whole },
        "description": { "type": ["string", "null"] },
        "pages": { "type": [whole, "null"] },
        "dateOfPublication": { "type": ["string", "null"], "format": "date" },
        "editionalLanguage": { "type": ["string", "null"] },
        "price": { "type": ["number", "null"] },
        "onlineStore": { "type": ["string", "null"] }
    });
    if with_id {
        properties["id"] = json!({ "type": whole });
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_fragment_documents_every_route() {
        let fragment = openapi_fragment();
        let paths = fragment["paths"].as_object().unwrap();

        assert!(paths["/mongodb"]["get"].is_object());
        assert!(paths["/mongodb"]["post"].is_object());
        assert!(paths["/mysql"]["get"].is_object());
        assert!(paths["/mysql"]["post"].is_object());
        assert!(paths["/mysql/{id}"]["put"].is_object());
        assert!(paths["/mysql/{id}"]["delete"].is_object());

        let schemas = &fragment["components"]["schemas"];
        assert!(schemas["BookInput"]["required"].is_null());
        assert!(paths["/mysql"]["post"]["responses"]["400"].is_null());
        assert_eq!(schemas["DocumentBook"]["properties"]["pages"]["type"], json!(["number", "null"]));
    }

    #[test]
    fn migration_creates_book_details_idempotently() {
        assert!(store::mysql::CREATE_TABLE.contains("CREATE TABLE IF NOT EXISTS bookDetails"));
    }
}
