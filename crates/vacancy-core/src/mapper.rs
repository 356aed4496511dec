//! Maps one company's raw API payload into normalized rows.
//!
//! All "field missing → default" behavior lives in [`FIELD_RULES`]; the
//! mapping code only looks fields up through it.

use serde_json::Value;

use crate::models::{CompanyPayload, NewCompany, NewVacancy};
use crate::salary::{LOWER_BOUND_KEY, normalize_salary, placeholder_salary};

/// What to do when a field is absent, `null`, or of the wrong type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// Emit nothing for the whole company.
    SkipCompany,
    /// Store SQL `NULL`.
    Null,
    /// Store `""`.
    EmptyString,
    /// Store the placeholder salary record.
    PlaceholderSalary,
}

/// One row of the defaulting table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    /// JSON pointers into a vacancy item; text fields join every string found.
    pub pointers: &'static [&'static str],
    pub on_missing: OnMissing,
}

pub const EMPLOYER_ID: FieldRule = FieldRule {
    field: "employer_id",
    pointers: &["/employer/id"],
    on_missing: OnMissing::SkipCompany,
};

pub const EMPLOYER_URL: FieldRule = FieldRule {
    field: "employer_url",
    pointers: &["/employer/alternate_url"],
    on_missing: OnMissing::Null,
};

pub const VACANCY_NAME: FieldRule = FieldRule {
    field: "name",
    pointers: &["/name"],
    on_missing: OnMissing::EmptyString,
};

pub const VACANCY_URL: FieldRule = FieldRule {
    field: "url",
    pointers: &["/url"],
    on_missing: OnMissing::EmptyString,
};

pub const VACANCY_DESCRIPTION: FieldRule = FieldRule {
    field: "description",
    pointers: &["/snippet/requirement", "/snippet/responsibility"],
    on_missing: OnMissing::EmptyString,
};

pub const VACANCY_SALARY: FieldRule = FieldRule {
    field: "salary",
    pointers: &["/salary"],
    on_missing: OnMissing::PlaceholderSalary,
};

/// The complete defaulting table consulted by the mapper.
pub const FIELD_RULES: &[FieldRule] = &[
    EMPLOYER_ID,
    EMPLOYER_URL,
    VACANCY_NAME,
    VACANCY_URL,
    VACANCY_DESCRIPTION,
    VACANCY_SALARY,
];

/// Rows produced for a company that had an employer id.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCompany {
    pub company: NewCompany,
    pub vacancies: Vec<NewVacancy>,
}

/// Result of mapping one company's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOutcome {
    Mapped(MappedCompany),
    NoVacancies,
    MissingEmployerId,
}

/// Map one company's raw payload (`{"items": [...]}`) into rows.
///
/// The employer is read from the first item only; every item becomes a
/// vacancy of that employer.
pub fn map_company(payload: &CompanyPayload) -> MappingOutcome {
    let items = payload.items();
    let Some(first) = items.first() else {
        return MappingOutcome::NoVacancies;
    };

    let Some(company_id) = employer_id(first) else {
        return MappingOutcome::MissingEmployerId;
    };

    let company = NewCompany {
        company_id,
        name: payload.name.clone(),
        url: optional_text(first, &EMPLOYER_URL),
    };

    let vacancies = items
        .iter()
        .map(|item| NewVacancy {
            company_id,
            name: text_or_empty(item, &VACANCY_NAME),
            url: text_or_empty(item, &VACANCY_URL),
            description: text_or_empty(item, &VACANCY_DESCRIPTION),
            salary: salary(item),
        })
        .collect();

    MappingOutcome::Mapped(MappedCompany { company, vacancies })
}

/// Employer id as an integer. The API sends it as a numeric string; plain
/// numbers are accepted too. Anything else counts as missing.
fn employer_id(item: &Value) -> Option<i64> {
    EMPLOYER_ID
        .pointers
        .iter()
        .filter_map(|pointer| item.pointer(pointer))
        .find_map(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

fn strings<'a>(item: &'a Value, rule: &FieldRule) -> Vec<&'a str> {
    rule.pointers
        .iter()
        .filter_map(|pointer| item.pointer(pointer))
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .collect()
}

fn optional_text(item: &Value, rule: &FieldRule) -> Option<String> {
    let found = strings(item, rule);
    if found.is_empty() {
        match rule.on_missing {
            OnMissing::EmptyString => Some(String::new()),
            _ => None,
        }
    } else {
        Some(found.join(" "))
    }
}

fn text_or_empty(item: &Value, rule: &FieldRule) -> String {
    optional_text(item, rule).unwrap_or_default()
}

/// The raw salary only counts when it is an object carrying a lower bound;
/// everything else maps to the placeholder before normalization.
fn salary(item: &Value) -> Value {
    let raw = VACANCY_SALARY
        .pointers
        .iter()
        .find_map(|pointer| item.pointer(pointer))
        .filter(|value| {
            value
                .as_object()
                .is_some_and(|object| object.contains_key(LOWER_BOUND_KEY))
        });

    match raw {
        Some(value) => normalize_salary(Some(value)),
        None => placeholder_salary(),
    }
}
