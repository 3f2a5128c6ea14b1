//! Postgres containers for the adapter tests
//!
//! Each [`db_test!`](crate::db_test) gets its own container with the billing
//! schema migrated. Containers need a running Docker daemon, so those tests
//! are ignored by default.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "billing";
const POSTGRES_PASSWORD: &str = "billing";
const POSTGRES_DB: &str = "billing_test";
const READY_MESSAGE: &str = "database system is ready to accept connections";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `postgres://` URL for the test credentials
pub fn billing_database_url(host: &str, port: u16) -> String {
    format!("postgres://{POSTGRES_USER}:{POSTGRES_PASSWORD}@{host}:{port}/{POSTGRES_DB}")
}

/// A migrated billing database; the container stops when this is dropped
pub struct BillingDatabase {
    _container: ContainerAsync<GenericImage>,
    pool: PgPool,
}

impl BillingDatabase {
    /// Starts Postgres and applies the migrations the server runs
    pub async fn start() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(READY_MESSAGE))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(5432).await?;
        let pool = PgPoolOptions::new()
            .max_connections(3)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&billing_database_url(&host, port))
            .await?;
        infra_db::run_migrations(&pool).await?;

        Ok(Self { _container: container, pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// An ignored async test with a fresh billing database bound to `$pool`
///
/// Run with `cargo test -- --ignored`.
///
/// ```rust,ignore
/// db_test!(test_settings_start_empty, |pool| {
///     let adapter = PostgresInvoiceAdapter::new(pool);
///     assert!(adapter.get_settings().await.unwrap().is_none());
/// });
/// ```
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$pool:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires Docker"]
        async fn $name() {
            let db = $crate::database::BillingDatabase::start()
                .await
                .expect("Failed to start billing database");
            let $pool = db.pool().clone();
            $body
        }
    };
}
