//! Plain-text report output on stdout.

use vacancy_core::ingest::{IngestReport, SkipReason, StoreSummary};
use vacancy_core::models::{BatchReport, CompanyIngestStatus, CompanyVacancyCount, Vacancy};
use vacancy_core::salary::describe_salary;

pub fn print_ingest_report(report: &IngestReport) {
    if report.batch.companies.is_empty() {
        println!("No data to process.");
    } else {
        print_batch(&report.batch);
    }

    for skipped in &report.skipped {
        match &skipped.reason {
            SkipReason::Fetch(error) => println!("  ! {}: request failed ({error})", skipped.name),
            SkipReason::NoVacancies => println!("  ! {}: no vacancies returned", skipped.name),
        }
    }

    println!(
        "Run started {} and took {:.1}s",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );

    println!();
    print_summary(&report.summary);
}

pub fn print_batch(batch: &BatchReport) {
    println!("Loaded companies:");
    for entry in &batch.companies {
        match entry.status {
            CompanyIngestStatus::Loaded {
                employer_id,
                vacancies,
            } => println!("  - {} (employer {employer_id}): {vacancies} vacancies", entry.name),
            CompanyIngestStatus::NoVacancies => println!("  - {}: no vacancies", entry.name),
            CompanyIngestStatus::MissingEmployerId => {
                println!("  - {}: employer id not found", entry.name)
            }
        }
    }
}

pub fn print_summary(summary: &StoreSummary) {
    println!("Total companies: {}", summary.companies);
    println!("Total vacancies: {}", summary.vacancies);
    match summary.average_salary {
        Some(average) => println!("Average salary: {average:.2}"),
        None => println!("Average salary: no salary data"),
    }

    println!("\nVacancies with salary above average:");
    print_vacancies(&summary.above_average);
}

pub fn print_company_counts(counts: &[CompanyVacancyCount]) {
    println!("\nVacancies per company:");
    for entry in counts {
        println!(
            "  {} (employer {}): {}",
            entry.name, entry.company_id, entry.vacancy_count
        );
    }
}

pub fn print_search(keyword: &str, matches: &[Vacancy]) {
    println!("\nVacancies matching '{keyword}':");
    print_vacancies(matches);
}

fn print_vacancies(vacancies: &[Vacancy]) {
    if vacancies.is_empty() {
        println!("  (none)");
        return;
    }
    for vacancy in vacancies {
        println!(
            "  [{}] {} | {} | {}",
            vacancy.company_id,
            vacancy.name,
            describe_salary(&vacancy.salary),
            vacancy.url.as_deref().unwrap_or("-")
        );
    }
}
