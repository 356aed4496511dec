pub mod error;
pub mod ingest;
pub mod mapper;
pub mod models;
pub mod roster;
pub mod salary;
pub mod snapshot;
pub mod traits;

#[cfg(test)]
pub mod testutil;

pub use error::AppError;
pub use ingest::{
    IngestEvent, IngestOptions, IngestReport, IngestReporter, IngestService, SkipReason,
    StoreSummary, TracingIngestReporter, fetch_batch,
};
pub use mapper::{MappedCompany, MappingOutcome, map_company};
pub use models::{
    BatchReport, Company, CompanyIngest, CompanyIngestStatus, CompanyPayload, CompanyVacancyCount,
    NewCompany, NewVacancy, Vacancy,
};
pub use roster::{ROSTER, RosterEntry, SelectionError, parse_selection, select_companies};
pub use salary::{normalize_salary, placeholder_salary};
pub use snapshot::{SnapshotDocument, SnapshotFile};
pub use traits::{VacancySource, VacancyStore};
