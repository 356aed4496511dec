use sqlx::{PgExecutor, PgPool, Pool, Postgres};
use tracing::debug;
use vacancy_core::error::AppError;
use vacancy_core::mapper::{MappingOutcome, map_company};
use vacancy_core::models::{
    BatchReport, Company, CompanyIngestStatus, CompanyPayload, CompanyVacancyCount, NewCompany,
    NewVacancy, Vacancy,
};
use vacancy_core::traits::VacancyStore;

use crate::schema::{CLEAR, SCHEMA};

/// Repository for companies and vacancies in PostgreSQL.
#[derive(Clone)]
pub struct VacancyRepository {
    pool: Pool<Postgres>,
}

impl VacancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create both tables if absent.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }

    /// Delete every row from both tables in one transaction.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        for statement in CLEAR {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Insert a company unless its employer id is already stored.
    /// Returns `false` when an existing row was kept.
    pub async fn upsert_company<'e, E>(executor: E, company: &NewCompany) -> Result<bool, AppError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO companies (company_id, name, url)
            VALUES ($1, $2, $3)
            ON CONFLICT (company_id) DO NOTHING
            "#,
        )
        .bind(company.company_id)
        .bind(&company.name)
        .bind(&company.url)
        .execute(executor)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    /// Insert one vacancy row. Returns the generated id.
    pub async fn insert_vacancy<'e, E>(executor: E, vacancy: &NewVacancy) -> Result<i64, AppError>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO vacancies (company_id, name, url, description, salary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(vacancy.company_id)
        .bind(&vacancy.name)
        .bind(&vacancy.url)
        .bind(&vacancy.description)
        .bind(&vacancy.salary)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.0)
    }

    /// Map and store a batch of company payloads under a single commit.
    ///
    /// Any statement failure rolls back the whole batch.
    pub async fn ingest_batch(&self, batch: &[CompanyPayload]) -> Result<BatchReport, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let mut report = BatchReport::default();

        for payload in batch {
            let status = match map_company(payload) {
                MappingOutcome::Mapped(mapped) => {
                    let employer_id = mapped.company.company_id;
                    if !Self::upsert_company(&mut *tx, &mapped.company).await? {
                        debug!(employer_id, company = %payload.name, "Company already stored");
                    }
                    for vacancy in &mapped.vacancies {
                        Self::insert_vacancy(&mut *tx, vacancy).await?;
                    }
                    CompanyIngestStatus::Loaded {
                        employer_id,
                        vacancies: mapped.vacancies.len(),
                    }
                }
                MappingOutcome::NoVacancies => CompanyIngestStatus::NoVacancies,
                MappingOutcome::MissingEmployerId => CompanyIngestStatus::MissingEmployerId,
            };
            report.push(&payload.name, status);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(report)
    }

    pub async fn company_count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }

    pub async fn vacancy_count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vacancies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        let rows = sqlx::query_as::<_, CompanyRow>(
            "SELECT id, company_id, name, url FROM companies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_vacancies(&self) -> Result<Vec<Vacancy>, AppError> {
        let rows = sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, company_id, name, url, description, salary
            FROM vacancies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Vacancies stored under an external employer id.
    pub async fn company_vacancy_count(&self, employer_id: i64) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vacancies WHERE company_id = $1")
            .bind(employer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }

    /// Every company with the number of vacancies stored for its employer id.
    pub async fn companies_with_vacancy_counts(
        &self,
    ) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let rows = sqlx::query_as::<_, CompanyCountRow>(
            r#"
            SELECT c.id, c.company_id, c.name, COUNT(v.id) AS vacancy_count
            FROM companies c
            LEFT JOIN vacancies v ON v.company_id = c.company_id
            GROUP BY c.id, c.company_id, c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mean of numeric `salary.from` values. Placeholder salaries and
    /// non-numeric bounds are ignored.
    pub async fn average_salary(&self) -> Result<Option<f64>, AppError> {
        let row: (Option<f64>,) = sqlx::query_as(
            r#"
            SELECT AVG(CASE WHEN jsonb_typeof(salary->'from') = 'number'
                            THEN (salary->>'from')::float8 END)
            FROM vacancies
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(row.0)
    }

    pub async fn vacancies_above_average(&self) -> Result<Vec<Vacancy>, AppError> {
        let rows = sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, company_id, name, url, description, salary
            FROM vacancies
            WHERE CASE WHEN jsonb_typeof(salary->'from') = 'number'
                       THEN (salary->>'from')::float8 END
                > (SELECT AVG(CASE WHEN jsonb_typeof(salary->'from') = 'number'
                                   THEN (salary->>'from')::float8 END)
                   FROM vacancies)
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search_vacancies(&self, keyword: &str) -> Result<Vec<Vacancy>, AppError> {
        let rows = sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, company_id, name, url, description, salary
            FROM vacancies
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(like_pattern(keyword))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// `%keyword%` with LIKE metacharacters escaped.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl VacancyStore for VacancyRepository {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        self.ensure_schema().await
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        self.clear_all().await
    }

    async fn ingest_batch(&self, batch: &[CompanyPayload]) -> Result<BatchReport, AppError> {
        self.ingest_batch(batch).await
    }

    async fn company_count(&self) -> Result<i64, AppError> {
        self.company_count().await
    }

    async fn vacancy_count(&self) -> Result<i64, AppError> {
        self.vacancy_count().await
    }

    async fn list_vacancies(&self) -> Result<Vec<Vacancy>, AppError> {
        self.list_vacancies().await
    }

    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.list_companies().await
    }

    async fn company_vacancy_count(&self, employer_id: i64) -> Result<i64, AppError> {
        self.company_vacancy_count(employer_id).await
    }

    async fn companies_with_vacancy_counts(&self) -> Result<Vec<CompanyVacancyCount>, AppError> {
        self.companies_with_vacancy_counts().await
    }

    async fn average_salary(&self) -> Result<Option<f64>, AppError> {
        self.average_salary().await
    }

    async fn vacancies_above_average(&self) -> Result<Vec<Vacancy>, AppError> {
        self.vacancies_above_average().await
    }

    async fn search_vacancies(&self, keyword: &str) -> Result<Vec<Vacancy>, AppError> {
        self.search_vacancies(keyword).await
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: i64,
    company_id: i64,
    name: String,
    url: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            url: row.url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VacancyRow {
    id: i64,
    company_id: i64,
    name: String,
    url: Option<String>,
    description: String,
    salary: serde_json::Value,
}

impl From<VacancyRow> for Vacancy {
    fn from(row: VacancyRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            url: row.url,
            description: row.description,
            salary: row.salary,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CompanyCountRow {
    id: i64,
    company_id: i64,
    name: String,
    vacancy_count: i64,
}

impl From<CompanyCountRow> for CompanyVacancyCount {
    fn from(row: CompanyCountRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            vacancy_count: row.vacancy_count,
        }
    }
}
