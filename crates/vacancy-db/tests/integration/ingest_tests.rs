use serde_json::json;
use vacancy_core::models::{CompanyIngestStatus, CompanyPayload, NewCompany};
use vacancy_core::salary::PLACEHOLDER_TEXT;
use vacancy_db::VacancyRepository;

use crate::integration::common::{employer, item, setup_test_db};

#[tokio::test]
async fn ingest_maps_and_stores_company_with_vacancies() {
    let (pool, _container) = setup_test_db().await;
    let repo = VacancyRepository::new(pool);

    // Schema creation is idempotent
    repo.ensure_schema().await.unwrap();

    let batch = vec![CompanyPayload::new(
        "Acme",
        json!({"items": [
            item(employer(42), "Data Analyst", json!({"from": 1000, "to": 2000, "currency": "RUR"})),
            item(employer(42), "Backend Developer", json!(null)),
        ]}),
    )];

    let report = repo.ingest_batch(&batch).await.unwrap();
    assert_eq!(
        report.companies[0].status,
        CompanyIngestStatus::Loaded {
            employer_id: 42,
            vacancies: 2
        }
    );
    assert_eq!(report.inserted_vacancies(), 2);

    assert_eq!(repo.company_count().await.unwrap(), 1);
    assert_eq!(repo.vacancy_count().await.unwrap(), 2);
    assert_eq!(repo.company_vacancy_count(42).await.unwrap(), 2);

    let companies = repo.list_companies().await.unwrap();
    assert_eq!(companies[0].company_id, 42);
    assert_eq!(companies[0].name, "Acme");
    assert_eq!(
        companies[0].url.as_deref(),
        Some("https://hh.ru/employer/42")
    );

    let vacancies = repo.list_vacancies().await.unwrap();
    assert_eq!(vacancies[0].name, "Data Analyst");
    assert_eq!(vacancies[0].description, "Data Analyst requirement");
    assert_eq!(vacancies[0].salary["from"], json!(1000));
    assert_eq!(vacancies[1].salary, json!({"value": PLACEHOLDER_TEXT}));

    assert_eq!(repo.average_salary().await.unwrap(), Some(1000.0));
    assert!(repo.vacancies_above_average().await.unwrap().is_empty());
    assert_eq!(repo.search_vacancies("data analyst").await.unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_company_keeps_first_row() {
    let (pool, _container) = setup_test_db().await;
    let repo = VacancyRepository::new(pool);

    let first = CompanyPayload::new("Acme", json!({"items": [item(employer(7), "A", json!(null))]}));
    let second = CompanyPayload::new(
        "Acme Renamed",
        json!({"items": [item(employer(7), "B", json!(null))]}),
    );

    repo.ingest_batch(&[first]).await.unwrap();
    repo.ingest_batch(&[second]).await.unwrap();

    let companies = repo.list_companies().await.unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Acme");
    // Vacancies are never deduplicated
    assert_eq!(repo.company_vacancy_count(7).await.unwrap(), 2);
}

#[tokio::test]
async fn upsert_company_reports_conflict() {
    let (pool, _container) = setup_test_db().await;

    let company = NewCompany {
        company_id: 9,
        name: "Nine".into(),
        url: None,
    };
    assert!(VacancyRepository::upsert_company(&pool, &company).await.unwrap());
    assert!(!VacancyRepository::upsert_company(&pool, &company).await.unwrap());
}

#[tokio::test]
async fn empty_and_anonymous_companies_do_not_stop_the_batch() {
    let (pool, _container) = setup_test_db().await;
    let repo = VacancyRepository::new(pool);

    let batch = vec![
        CompanyPayload::new("Empty", json!({"items": []})),
        CompanyPayload::new("NoItemsKey", json!({})),
        CompanyPayload::new(
            "Anonymous",
            json!({"items": [item(json!({"name": "no id"}), "Orphan", json!(null))]}),
        ),
        CompanyPayload::new(
            "Ozon",
            json!({"items": [item(employer(2180), "Picker", json!({"from": 60000}))]}),
        ),
    ];

    let report = repo.ingest_batch(&batch).await.unwrap();
    let statuses: Vec<_> = report.companies.iter().map(|c| c.status.clone()).collect();
    assert_eq!(
        statuses,
        vec![
            CompanyIngestStatus::NoVacancies,
            CompanyIngestStatus::NoVacancies,
            CompanyIngestStatus::MissingEmployerId,
            CompanyIngestStatus::Loaded {
                employer_id: 2180,
                vacancies: 1
            },
        ]
    );

    // Only the company after the skipped ones was written
    let companies = repo.list_companies().await.unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].company_id, 2180);
    assert_eq!(repo.vacancy_count().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_batch_rolls_back_everything() {
    let (pool, _container) = setup_test_db().await;
    let repo = VacancyRepository::new(pool.clone());

    sqlx::query("DROP TABLE vacancies")
        .execute(&pool)
        .await
        .unwrap();

    let batch = vec![CompanyPayload::new(
        "Acme",
        json!({"items": [item(employer(1), "A", json!(null))]}),
    )];
    let err = repo.ingest_batch(&batch).await.unwrap_err();
    assert!(matches!(err, vacancy_core::AppError::DatabaseError(_)));

    // The company insert ran inside the aborted transaction
    assert_eq!(repo.company_count().await.unwrap(), 0);
}

#[tokio::test]
async fn clear_all_empties_both_tables() {
    let (pool, _container) = setup_test_db().await;
    let repo = VacancyRepository::new(pool);

    let batch = vec![CompanyPayload::new(
        "Acme",
        json!({"items": [item(employer(3), "A", json!({"from": 10}))]}),
    )];
    repo.ingest_batch(&batch).await.unwrap();
    assert_eq!(repo.vacancy_count().await.unwrap(), 1);

    repo.clear_all().await.unwrap();
    assert_eq!(repo.company_count().await.unwrap(), 0);
    assert_eq!(repo.vacancy_count().await.unwrap(), 0);
    assert_eq!(repo.average_salary().await.unwrap(), None);
}
