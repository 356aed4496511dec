use serde::{Deserialize, Serialize};

/// A stored employer row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    /// Store-assigned identity.
    pub id: i64,
    /// External employer id from the vacancy API.
    pub company_id: i64,
    pub name: String,
    pub url: Option<String>,
}

/// A stored vacancy row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vacancy {
    pub id: i64,
    /// External employer id of the owning company (soft reference).
    pub company_id: i64,
    pub name: String,
    pub url: Option<String>,
    pub description: String,
    /// Always a JSON object: either the source salary or the placeholder record.
    pub salary: serde_json::Value,
}

/// DTO for upserting a company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCompany {
    pub company_id: i64,
    pub name: String,
    pub url: Option<String>,
}

/// DTO for inserting a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVacancy {
    pub company_id: i64,
    pub name: String,
    pub url: String,
    pub description: String,
    pub salary: serde_json::Value,
}

/// A company together with its vacancy count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyVacancyCount {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub vacancy_count: i64,
}

/// Raw API response for one company, keyed by its display name.
///
/// `payload` is kept verbatim (`{"items": [...]}`); it feeds both the
/// record mapper and the on-disk snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPayload {
    pub name: String,
    pub payload: serde_json::Value,
}

impl CompanyPayload {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Vacancy items of the payload; empty when `items` is absent or not an array.
    pub fn items(&self) -> &[serde_json::Value] {
        self.payload
            .get("items")
            .and_then(|items| items.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// What happened to one company inside an ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompanyIngestStatus {
    /// Company upserted and `vacancies` rows inserted.
    Loaded { employer_id: i64, vacancies: usize },
    /// `items` was empty or absent.
    NoVacancies,
    /// The first item carried no usable employer id.
    MissingEmployerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyIngest {
    pub name: String,
    #[serde(flatten)]
    pub status: CompanyIngestStatus,
}

/// Outcome of one `ingest_batch` call, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub companies: Vec<CompanyIngest>,
}

impl BatchReport {
    pub fn push(&mut self, name: &str, status: CompanyIngestStatus) {
        self.companies.push(CompanyIngest {
            name: name.to_string(),
            status,
        });
    }

    /// Total vacancy rows inserted by the batch.
    pub fn inserted_vacancies(&self) -> usize {
        self.companies
            .iter()
            .map(|c| match c.status {
                CompanyIngestStatus::Loaded { vacancies, .. } => vacancies,
                _ => 0,
            })
            .sum()
    }

    /// Number of companies that produced rows.
    pub fn loaded_companies(&self) -> usize {
        self.companies
            .iter()
            .filter(|c| matches!(c.status, CompanyIngestStatus::Loaded { .. }))
            .count()
    }
}
