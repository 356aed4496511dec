//! Table definitions, applied one statement at a time.

/// `companies.company_id` is unique so a re-ingested employer keeps its
/// first stored row.
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS companies (
        id BIGSERIAL PRIMARY KEY,
        company_id BIGINT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        url TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS vacancies (
        id BIGSERIAL PRIMARY KEY,
        company_id BIGINT NOT NULL,
        name TEXT NOT NULL,
        url TEXT,
        description TEXT NOT NULL DEFAULT '',
        salary JSONB NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_vacancies_company_id ON vacancies(company_id)"#,
];

/// Statements that empty both tables.
pub const CLEAR: &[&str] = &["DELETE FROM vacancies", "DELETE FROM companies"];
