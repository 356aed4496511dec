use std::future::Future;

use crate::error::AppError;
use crate::models::{BatchReport, Company, CompanyPayload, CompanyVacancyCount, Vacancy};

/// Fetches raw vacancy listings for one employer from the source API.
pub trait VacancySource: Send + Sync + Clone {
    /// Returns the raw response body (`{"items": [...], ...}`).
    ///
    /// Any non-200 status or transport failure is an error; an empty `items`
    /// array is a successful response.
    fn fetch_vacancies(
        &self,
        employer_id: i64,
    ) -> impl Future<Output = Result<serde_json::Value, AppError>> + Send;
}

/// Relational store for companies and vacancies.
pub trait VacancyStore: Send + Sync + Clone {
    /// Create both tables if absent. Idempotent.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Delete every company and vacancy row.
    fn clear_all(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Map and persist every company of the batch under one commit.
    ///
    /// Companies without vacancies or without an employer id are reported,
    /// not errors. A storage failure aborts the whole batch.
    fn ingest_batch(
        &self,
        batch: &[CompanyPayload],
    ) -> impl Future<Output = Result<BatchReport, AppError>> + Send;

    fn company_count(&self) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn vacancy_count(&self) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn list_vacancies(&self) -> impl Future<Output = Result<Vec<Vacancy>, AppError>> + Send;

    fn list_companies(&self) -> impl Future<Output = Result<Vec<Company>, AppError>> + Send;

    /// Number of vacancies stored for one external employer id.
    fn company_vacancy_count(
        &self,
        employer_id: i64,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    /// Every company with its vacancy count, ordered by name.
    fn companies_with_vacancy_counts(
        &self,
    ) -> impl Future<Output = Result<Vec<CompanyVacancyCount>, AppError>> + Send;

    /// Mean numeric lower bound over vacancies that have one.
    /// `None` when no vacancy carries a numeric salary.
    fn average_salary(&self) -> impl Future<Output = Result<Option<f64>, AppError>> + Send;

    /// Vacancies whose numeric lower bound exceeds [`average_salary`](Self::average_salary).
    fn vacancies_above_average(
        &self,
    ) -> impl Future<Output = Result<Vec<Vacancy>, AppError>> + Send;

    /// Case-insensitive substring match on name or description.
    /// An empty keyword matches every vacancy.
    fn search_vacancies(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<Vacancy>, AppError>> + Send;
}
