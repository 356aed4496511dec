pub mod config;
pub mod database;
pub mod repository;
pub mod schema;

pub use config::DatabaseConfig;
pub use database::Database;
pub use repository::VacancyRepository;
