//! Common utilities for compiler tests

use std::str::FromStr;

use anyhow::Result;
use bb8_postgres::PostgresConnectionManager;
use nestql::{DeclaredType, FieldPath, FieldTypes};
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tracing::Level;

#[allow(unused)]
pub type Pool = bb8::Pool<PostgresConnectionManager<tokio_postgres::NoTls>>;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// Schema fragment for the user view most tests query
#[allow(unused)]
pub fn user_types() -> FieldTypes {
    FieldTypes::new()
        .with("profile.age", DeclaredType::Int)
        .with("profile.verified", DeclaredType::Boolean)
        .with("profile.username", DeclaredType::String)
        .with("location.ltreePath", DeclaredType::LTree)
        .with("location.coordinates", DeclaredType::Coordinate)
        .with("server.port", DeclaredType::Port)
        .with("createdAt", DeclaredType::DateTime)
}

#[allow(unused)]
pub fn fields(count: usize) -> Vec<FieldPath> { (0..count).map(|i| FieldPath::new(format!("f{}", i), ["attrs".to_string(), format!("f{}", i)])).collect() }

/// Schema fragment for the `tv_device` rows seeded by `pg_init.sql`
#[allow(unused)]
pub fn device_types() -> FieldTypes {
    FieldTypes::new()
        .with("profile.age", DeclaredType::Int)
        .with("profile.verified", DeclaredType::Boolean)
        .with("location.ltreePath", DeclaredType::LTree)
        .with("location.coordinates", DeclaredType::Coordinate)
        .with("server.port", DeclaredType::Port)
        .with("server.ip", DeclaredType::IpAddress)
        .with("server.network", DeclaredType::IpAddress)
        .with("server.mac", DeclaredType::MacAddress)
        .with("createdAt", DeclaredType::DateTime)
        .with("installedOn", DeclaredType::Date)
        .with("warranty", DeclaredType::DateRange)
        .with("tags", DeclaredType::List)
        .with("notes", DeclaredType::FullText)
}

#[allow(unused)]
pub async fn create_postgres_container() -> Result<(ContainerAsync<postgres::Postgres>, Pool)> {
    let container: ContainerAsync<postgres::Postgres> = postgres::Postgres::default()
        .with_db_name("nestql")
        .with_user("postgres")
        .with_password("postgres")
        .with_init_sql(include_str!("../pg_init.sql").to_string().into_bytes())
        .start()
        .await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let manager = PostgresConnectionManager::new_from_stringlike(
        format!("host={host} port={port} user=postgres password=postgres dbname=nestql"),
        tokio_postgres::NoTls,
    )?;
    let pool = bb8::Pool::builder().build(manager).await?;

    Ok((container, pool))
}
