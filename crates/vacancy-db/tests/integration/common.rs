use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use vacancy_db::VacancyRepository;

/// Spins up a PostgreSQL container and returns a connected pool with the
/// schema applied.
///
/// The `ContainerAsync` must be kept in scope for the test duration:
/// dropping it stops the container.
pub async fn setup_test_db() -> (PgPool, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "hh_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/hh_test");

    // Retry connection until container is fully ready
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(1)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    VacancyRepository::new(pool.clone())
        .ensure_schema()
        .await
        .expect("Failed to create schema");

    (pool, container)
}

/// A vacancy item shaped like the API's.
pub fn item(employer: Value, name: &str, salary: Value) -> Value {
    json!({
        "name": name,
        "url": format!("https://api.hh.ru/vacancies/{name}"),
        "employer": employer,
        "snippet": {
            "requirement": format!("{name} requirement"),
            "responsibility": null,
        },
        "salary": salary,
    })
}

/// Employer object with a string id, the way the API sends it.
pub fn employer(id: i64) -> Value {
    json!({"id": id.to_string(), "alternate_url": format!("https://hh.ru/employer/{id}")})
}
