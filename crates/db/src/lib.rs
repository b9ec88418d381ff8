//! Database handles for the bookstore service.
//!
//! Both stores are opened lazily: a bad URL fails fast, but an unreachable
//! server only surfaces when a probe or a request touches it.

use std::time::Duration;

use anyhow::Context;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

pub mod migrate;

/// Explicitly constructed client handles shared by all request handlers.
#[derive(Clone, Debug)]
pub struct Databases {
    pub mysql: MySqlPool,
    pub mongo_client: Client,
    pub mongo: Database,
}

/// Connection parameters for both stores.
#[derive(Debug, Clone)]
pub struct ConnectOptions<'a> {
    pub mysql_url: &'a str,
    pub mysql_max_connections: u32,
    pub mongo_uri: &'a str,
    pub mongo_database: &'a str,
    /// Upper bound for acquiring a MySQL connection and for MongoDB server
    /// selection. Must stay below the HTTP request timeout.
    pub timeout: Duration,
}

impl Databases {
    /// Build both handles without requiring either server to be reachable.
    pub async fn connect(options: ConnectOptions<'_>) -> anyhow::Result<Self> {
        let mysql = MySqlPoolOptions::new()
            .max_connections(options.mysql_max_connections)
            .acquire_timeout(options.timeout)
            .connect_lazy(options.mysql_url)
            .context("invalid MySQL connection URL")?;

        let mut mongo_options = ClientOptions::parse(options.mongo_uri)
            .await
            .context("invalid MongoDB connection URI")?;
        mongo_options.server_selection_timeout = Some(options.timeout);
        mongo_options.connect_timeout = Some(options.timeout);
        let mongo_client =
            Client::with_options(mongo_options).context("invalid MongoDB client options")?;
        let mongo = mongo_client.database(options.mongo_database);

        Ok(Self {
            mysql,
            mongo_client,
            mongo,
        })
    }

    /// Acquire a MySQL connection to verify the server is reachable.
    pub async fn ping_mysql(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.mysql)
            .await
            .context("MySQL ping failed")?;
        Ok(())
    }

    /// Run the `ping` admin command against the MongoDB database.
    pub async fn ping_mongo(&self) -> anyhow::Result<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }

    /// Probe both stores and log the outcome. Never fails: an unreachable
    /// store leaves only its own routes degraded.
    pub async fn probe(&self) {
        match self.ping_mongo().await {
            Ok(()) => tracing::info!(target: "bookstore-db", "connected to MongoDB"),
            Err(err) => {
                tracing::error!(target: "bookstore-db", error = ?err, "error connecting to MongoDB")
            }
        }

        match self.ping_mysql().await {
            Ok(()) => tracing::info!(target: "bookstore-db", "connected to MySQL"),
            Err(err) => {
                tracing::error!(target: "bookstore-db", error = ?err, "error connecting to MySQL")
            }
        }
    }

    /// Close the MySQL pool and shut down the MongoDB client.
    pub async fn close(self) {
        self.mysql.close().await;
        self.mongo_client.shutdown().await;
        tracing::info!(target: "bookstore-db", "database handles closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_is_lazy() {
        let dbs = Databases::connect(ConnectOptions {
            mysql_url: "mysql://root@127.0.0.1:1/product",
            mysql_max_connections: 1,
            mongo_uri: "mongodb://127.0.0.1:1",
            mongo_database: "bookstore",
            timeout: Duration::from_millis(250),
        })
        .await
        .expect("lazy handles should build without a server");

        assert_eq!(dbs.mongo.name(), "bookstore");
        assert_eq!(dbs.mysql.options().get_acquire_timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unreachable_stores_fail_within_timeout() {
        let dbs = Databases::connect(ConnectOptions {
            mysql_url: "mysql://root@127.0.0.1:1/product",
            mysql_max_connections: 1,
            mongo_uri: "mongodb://127.0.0.1:1",
            mongo_database: "bookstore",
            timeout: Duration::from_millis(250),
        })
        .await
        .unwrap();

        let started = std::time::Instant::now();
        assert!(dbs.ping_mongo().await.is_err());
        assert!(dbs.ping_mysql().await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_urls() {
        let result = Databases::connect(ConnectOptions {
            mysql_url: "not a url",
            mysql_max_connections: 1,
            mongo_uri: "mongodb://127.0.0.1:1",
            mongo_database: "bookstore",
            timeout: Duration::from_millis(250),
        })
        .await;

        assert!(result.is_err());
    }
}
