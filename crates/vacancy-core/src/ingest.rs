use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::{BatchReport, CompanyIngestStatus, CompanyPayload, Vacancy};
use crate::roster::RosterEntry;
use crate::snapshot::{SnapshotFile, SnapshotOrigin};
use crate::traits::{VacancySource, VacancyStore};

/// Why a company contributed nothing to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Non-200 status, transport failure, or undecodable body.
    Fetch(String),
    /// The API answered with no vacancy items.
    NoVacancies,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCompany {
    pub name: String,
    pub reason: SkipReason,
}

/// Payloads fetched for a selection, plus the companies that yielded nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBatch {
    pub payloads: Vec<CompanyPayload>,
    pub skipped: Vec<SkippedCompany>,
}

/// Events emitted during an ingestion run for monitoring/logging.
#[derive(Debug, Clone)]
pub enum IngestEvent<'a> {
    RunStarted {
        companies: usize,
    },
    TablesCleared,
    CompanyFetched {
        company: &'a str,
        vacancies: usize,
    },
    CompanySkipped {
        company: &'a str,
        reason: &'a SkipReason,
    },
    CompanyLoaded {
        company: &'a str,
        employer_id: i64,
        vacancies: usize,
    },
    CompanyWithoutVacancies {
        company: &'a str,
    },
    EmployerIdMissing {
        company: &'a str,
    },
    NothingToIngest,
    SnapshotLoaded {
        path: &'a Path,
        origin: SnapshotOrigin,
        companies: usize,
    },
    SnapshotUpdated {
        path: &'a Path,
        companies: usize,
    },
    RunFinished {
        loaded: usize,
        skipped: usize,
    },
}

/// Trait for receiving ingestion events (decoupled logging).
pub trait IngestReporter: Send + Sync {
    fn report(&self, event: IngestEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIngestReporter;

impl IngestReporter for TracingIngestReporter {
    fn report(&self, event: IngestEvent<'_>) {
        match event {
            IngestEvent::RunStarted { companies } => {
                tracing::info!(%companies, "Ingestion started");
            }
            IngestEvent::TablesCleared => {
                tracing::info!("Cleared companies and vacancies tables");
            }
            IngestEvent::CompanyFetched { company, vacancies } => {
                tracing::info!(%company, %vacancies, "Fetched vacancies");
            }
            IngestEvent::CompanySkipped { company, reason } => match reason {
                SkipReason::Fetch(error) => {
                    tracing::warn!(%company, %error, "Request failed, skipping company");
                }
                SkipReason::NoVacancies => {
                    tracing::warn!(%company, "No vacancies returned, skipping company");
                }
            },
            IngestEvent::CompanyLoaded {
                company,
                employer_id,
                vacancies,
            } => {
                tracing::info!(%company, %employer_id, %vacancies, "Company loaded");
            }
            IngestEvent::CompanyWithoutVacancies { company } => {
                tracing::warn!(%company, "Company has no vacancies");
            }
            IngestEvent::EmployerIdMissing { company } => {
                tracing::warn!(%company, "Employer id not found");
            }
            IngestEvent::NothingToIngest => {
                tracing::warn!("No data to process");
            }
            IngestEvent::SnapshotLoaded {
                path,
                origin,
                companies,
            } => match origin {
                SnapshotOrigin::Decoded(encoding) => {
                    tracing::info!(path = %path.display(), %encoding, %companies, "Snapshot loaded");
                }
                SnapshotOrigin::Missing => {
                    tracing::warn!(path = %path.display(), "Snapshot file not found");
                }
                SnapshotOrigin::Unreadable => {
                    tracing::warn!(path = %path.display(), "Snapshot file could not be decoded");
                }
            },
            IngestEvent::SnapshotUpdated { path, companies } => {
                tracing::info!(path = %path.display(), %companies, "Snapshot written");
            }
            IngestEvent::RunFinished { loaded, skipped } => {
                tracing::info!(%loaded, %skipped, "Ingestion finished");
            }
        }
    }
}

/// Fetch every company in order, one request each.
///
/// Transport failures and empty results are recorded as skips; only a
/// non-transport error from the source aborts.
pub async fn fetch_batch<S: VacancySource>(
    source: &S,
    companies: &[RosterEntry],
    reporter: &dyn IngestReporter,
) -> Result<FetchedBatch, AppError> {
    let mut fetched = FetchedBatch::default();

    for entry in companies {
        let reason = match source.fetch_vacancies(entry.employer_id).await {
            Ok(body) => match non_empty_items(&body) {
                Some(items) => {
                    reporter.report(IngestEvent::CompanyFetched {
                        company: entry.name,
                        vacancies: items.len(),
                    });
                    fetched
                        .payloads
                        .push(CompanyPayload::new(entry.name, json!({ "items": items })));
                    continue;
                }
                None => SkipReason::NoVacancies,
            },
            Err(e) if e.is_transport() => SkipReason::Fetch(e.to_string()),
            Err(e) => return Err(e),
        };

        reporter.report(IngestEvent::CompanySkipped {
            company: entry.name,
            reason: &reason,
        });
        fetched.skipped.push(SkippedCompany {
            name: entry.name.to_string(),
            reason,
        });
    }

    Ok(fetched)
}

fn non_empty_items(body: &Value) -> Option<&Vec<Value>> {
    body.get("items")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

/// Options for one ingestion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Delete all rows before loading.
    pub clear_tables: bool,
}

/// Aggregates read back from the store after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub companies: i64,
    pub vacancies: i64,
    pub average_salary: Option<f64>,
    pub above_average: Vec<Vacancy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub requested: usize,
    pub skipped: Vec<SkippedCompany>,
    pub batch: BatchReport,
    pub snapshot_updated: bool,
    pub summary: StoreSummary,
}

impl IngestReport {
    /// Wall-clock time the run took.
    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

/// Counts, average salary, and above-average listings read from `store`.
pub async fn summarize<St: VacancyStore>(store: &St) -> Result<StoreSummary, AppError> {
    Ok(StoreSummary {
        companies: store.company_count().await?,
        vacancies: store.vacancy_count().await?,
        average_salary: store.average_salary().await?,
        above_average: store.vacancies_above_average().await?,
    })
}

/// Persist the current snapshot document as one batch. Needs no source.
pub async fn load_snapshot<St: VacancyStore>(
    store: &St,
    snapshot: &SnapshotFile,
    reporter: &dyn IngestReporter,
) -> Result<BatchReport, AppError> {
    store.ensure_schema().await?;

    let loaded = snapshot.load();
    reporter.report(IngestEvent::SnapshotLoaded {
        path: snapshot.path(),
        origin: loaded.origin,
        companies: loaded.document.len(),
    });

    let batch: Vec<CompanyPayload> = loaded
        .document
        .into_iter()
        .map(|(name, payload)| CompanyPayload::new(name, payload))
        .collect();
    if batch.is_empty() {
        reporter.report(IngestEvent::NothingToIngest);
        return Ok(BatchReport::default());
    }

    let report = store.ingest_batch(&batch).await?;
    report_batch(reporter, &report);
    Ok(report)
}

fn report_batch(reporter: &dyn IngestReporter, batch: &BatchReport) {
    for entry in &batch.companies {
        let company = entry.name.as_str();
        let event = match entry.status {
            CompanyIngestStatus::Loaded {
                employer_id,
                vacancies,
            } => IngestEvent::CompanyLoaded {
                company,
                employer_id,
                vacancies,
            },
            CompanyIngestStatus::NoVacancies => IngestEvent::CompanyWithoutVacancies { company },
            CompanyIngestStatus::MissingEmployerId => IngestEvent::EmployerIdMissing { company },
        };
        reporter.report(event);
    }
}

/// Drives an ingestion run: schema → optional clear → fetch → map/persist →
/// snapshot merge → summary.
///
/// Generic over the source and the store so runs can be tested without
/// network or database.
pub struct IngestService<S, St>
where
    S: VacancySource,
    St: VacancyStore,
{
    source: S,
    store: St,
    snapshot: SnapshotFile,
    reporter: Box<dyn IngestReporter>,
}

impl<S, St> IngestService<S, St>
where
    S: VacancySource,
    St: VacancyStore,
{
    pub fn new(source: S, store: St, snapshot: SnapshotFile) -> Self {
        Self {
            source,
            store,
            snapshot,
            reporter: Box::new(TracingIngestReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Box<dyn IngestReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Run one ingestion for the selected companies.
    ///
    /// The whole fetched batch is persisted with a single commit. A storage
    /// error aborts the run before the snapshot is touched.
    pub async fn run(
        &self,
        companies: &[RosterEntry],
        options: IngestOptions,
    ) -> Result<IngestReport, AppError> {
        let started_at = Utc::now();
        self.reporter.report(IngestEvent::RunStarted {
            companies: companies.len(),
        });

        self.store.ensure_schema().await?;
        if options.clear_tables {
            self.store.clear_all().await?;
            self.reporter.report(IngestEvent::TablesCleared);
        }

        let fetched = fetch_batch(&self.source, companies, self.reporter.as_ref()).await?;

        let (batch, snapshot_updated) = if fetched.payloads.is_empty() {
            self.reporter.report(IngestEvent::NothingToIngest);
            (BatchReport::default(), false)
        } else {
            let batch = self.store.ingest_batch(&fetched.payloads).await?;
            report_batch(self.reporter.as_ref(), &batch);

            let merged = self.snapshot.merge_batch(&fetched.payloads)?;
            self.reporter.report(IngestEvent::SnapshotUpdated {
                path: self.snapshot.path(),
                companies: merged.len(),
            });
            (batch, true)
        };

        let summary = summarize(&self.store).await?;
        self.reporter.report(IngestEvent::RunFinished {
            loaded: batch.loaded_companies(),
            skipped: fetched.skipped.len(),
        });

        Ok(IngestReport {
            started_at,
            finished_at: Utc::now(),
            requested: companies.len(),
            skipped: fetched.skipped,
            batch,
            snapshot_updated,
            summary,
        })
    }

    /// Persist the current snapshot document as one batch.
    pub async fn load_snapshot(&self) -> Result<BatchReport, AppError> {
        load_snapshot(&self.store, &self.snapshot, self.reporter.as_ref()).await
    }

    /// Keyword search over stored vacancies. Any string is accepted.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Vacancy>, AppError> {
        self.store.search_vacancies(keyword).await
    }
}
