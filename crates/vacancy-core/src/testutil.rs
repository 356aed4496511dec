//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::error::AppError;
use crate::ingest::{IngestEvent, IngestReporter};
use crate::mapper::{MappingOutcome, map_company};
use crate::models::{
    BatchReport, Company, CompanyIngestStatus, CompanyPayload, CompanyVacancyCount, Vacancy,
};
use crate::salary::lower_bound;
use crate::traits::{VacancySource, VacancyStore};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// Mock source with a queue of canned responses per employer id.
///
/// An employer with no queued response answers with an empty `items` list.
#[derive(Clone, Default)]
pub struct MockSource {
    responses: Arc<Mutex<HashMap<i64, VecDeque<Result<Value, AppError>>>>>,
    requests: Arc<Mutex<Vec<i64>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, employer_id: i64, body: Value) -> Self {
        self.push(employer_id, Ok(body))
    }

    pub fn fail(self, employer_id: i64, error: AppError) -> Self {
        self.push(employer_id, Err(error))
    }

    fn push(self, employer_id: i64, response: Result<Value, AppError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(employer_id)
            .or_default()
            .push_back(response);
        self
    }

    /// Employer ids requested so far, in call order.
    pub fn requests(&self) -> Vec<i64> {
        self.requests.lock().unwrap().clone()
    }
}

impl VacancySource for MockSource {
    async fn fetch_vacancies(&self, employer_id: i64) -> Result<Value, AppError> {
        self.requests.lock().unwrap().push(employer_id);
        let mut responses = self.responses.lock().unwrap();
        responses
            .get_mut(&employer_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(json!({"items": []})))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    companies: Vec<Company>,
    vacancies: Vec<Vacancy>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn average_salary(&self) -> Option<f64> {
        let bounds: Vec<f64> = self
            .vacancies
            .iter()
            .filter_map(|v| lower_bound(&v.salary))
            .collect();
        if bounds.is_empty() {
            None
        } else {
            Some(bounds.iter().sum::<f64>() / bounds.len() as f64)
        }
    }
}

/// In-memory store with the same semantics as the PostgreSQL repository:
/// first-write-wins companies, no vacancy dedup, all-or-nothing batches.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    ingest_error: Arc<Mutex<Option<AppError>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose next `ingest_batch` fails without applying anything.
    pub fn with_ingest_error(error: AppError) -> Self {
        Self {
            state: Arc::default(),
            ingest_error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl VacancyStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.companies.clear();
        state.vacancies.clear();
        Ok(())
    }

    async fn ingest_batch(&self, batch: &[CompanyPayload]) -> Result<BatchReport, AppError> {
        if let Some(e) = self.ingest_error.lock().unwrap().take() {
            return Err(e);
        }

        let mut state = self.state.lock().unwrap();
        let mut report = BatchReport::default();
        for payload in batch {
            let status = match map_company(payload) {
                MappingOutcome::Mapped(mapped) => {
                    let employer_id = mapped.company.company_id;
                    if !state.companies.iter().any(|c| c.company_id == employer_id) {
                        let id = state.next_id();
                        state.companies.push(Company {
                            id,
                            company_id: employer_id,
                            name: mapped.company.name,
                            url: mapped.company.url,
                        });
                    }
                    let vacancies = mapped.vacancies.len();
                    for vacancy in mapped.vacancies {
                        let id = state.next_id();
                        state.vacancies.push(Vacancy {
                            id,
                            company_id: vacancy.company_id,
                            name: vacancy.name,
                            url: Some(vacancy.url),
                            description: vacancy.description,
                            salary: vacancy.salary,
                        });
                    }
                    CompanyIngestStatus::Loaded {
                        employer_id,
                        vacancies,
                    }
                }
                MappingOutcome::NoVacancies => CompanyIngestStatus::NoVacancies,
                MappingOutcome::MissingEmployerId => CompanyIngestStatus::MissingEmployerId,
            };
            report.push(&payload.name, status);
        }
        Ok(report)
    }

    async fn company_count(&self) -> Result<i64, AppError> {
        Ok(self.state.lock().unwrap().companies.len() as i64)
    }

    async fn vacancy_count(&self) -> Result<i64, AppError> {
        Ok(self.state.lock().unwrap().vacancies.len() as i64)
    }

    async fn list_vacancies(&self) -> Result<Vec<Vacancy>, AppError> {
        Ok(self.state.lock().unwrap().vacancies.clone())
    }

    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        Ok(self.state.lock().unwrap().companies.clone())
    }

    async fn company_vacancy_count(&self, employer_id: i64) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .vacancies
            .iter()
            .filter(|v| v.company_id == employer_id)
            .count() as i64)
    }

    async fn companies_with_vacancy_counts(&self) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let state = self.state.lock().unwrap();
        let mut counts: Vec<_> = state
            .companies
            .iter()
            .map(|c| CompanyVacancyCount {
                id: c.id,
                company_id: c.company_id,
                name: c.name.clone(),
                vacancy_count: state
                    .vacancies
                    .iter()
                    .filter(|v| v.company_id == c.company_id)
                    .count() as i64,
            })
            .collect();
        counts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counts)
    }

    async fn average_salary(&self) -> Result<Option<f64>, AppError> {
        Ok(self.state.lock().unwrap().average_salary())
    }

    async fn vacancies_above_average(&self) -> Result<Vec<Vacancy>, AppError> {
        let state = self.state.lock().unwrap();
        let Some(average) = state.average_salary() else {
            return Ok(vec![]);
        };
        Ok(state
            .vacancies
            .iter()
            .filter(|v| lower_bound(&v.salary).is_some_and(|from| from > average))
            .cloned()
            .collect())
    }

    async fn search_vacancies(&self, keyword: &str) -> Result<Vec<Vacancy>, AppError> {
        let needle = keyword.to_lowercase();
        let state = self.state.lock().unwrap();
        Ok(state
            .vacancies
            .iter()
            .filter(|v| {
                v.name.to_lowercase().contains(&needle)
                    || v.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Reporter that records event labels.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IngestReporter for RecordingReporter {
    fn report(&self, event: IngestEvent<'_>) {
        let label = match &event {
            IngestEvent::RunStarted { .. } => "RunStarted",
            IngestEvent::TablesCleared => "TablesCleared",
            IngestEvent::CompanyFetched { .. } => "CompanyFetched",
            IngestEvent::CompanySkipped { .. } => "CompanySkipped",
            IngestEvent::CompanyLoaded { .. } => "CompanyLoaded",
            IngestEvent::CompanyWithoutVacancies { .. } => "CompanyWithoutVacancies",
            IngestEvent::EmployerIdMissing { .. } => "EmployerIdMissing",
            IngestEvent::NothingToIngest => "NothingToIngest",
            IngestEvent::SnapshotLoaded { .. } => "SnapshotLoaded",
            IngestEvent::SnapshotUpdated { .. } => "SnapshotUpdated",
            IngestEvent::RunFinished { .. } => "RunFinished",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A vacancy item shaped like the API's, with an optional salary object.
pub fn vacancy_item(employer_id: i64, name: &str, salary: Option<Value>) -> Value {
    json!({
        "name": name,
        "url": format!("https://api.hh.ru/vacancies/{employer_id}-{}", name.len()),
        "employer": {
            "id": employer_id.to_string(),
            "alternate_url": format!("https://hh.ru/employer/{employer_id}"),
        },
        "salary": salary,
    })
}

/// An API response body wrapping the given items.
pub fn vacancies_body(items: Vec<Value>) -> Value {
    json!({ "items": items, "found": items.len(), "pages": 1, "page": 0 })
}
