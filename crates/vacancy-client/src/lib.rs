pub mod config;
pub mod fetcher;

pub use config::ApiConfig;
pub use fetcher::HhClient;
