//! Interactive prompts for the ingest flow.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use vacancy_core::roster::{ROSTER, RosterEntry, parse_selection, select_companies};

pub fn confirm_clear() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Clear the companies and vacancies tables before loading?")
        .default(false)
        .interact()?)
}

/// Print the roster and ask for 1-based indices until the answer parses.
pub fn choose_companies() -> Result<Vec<RosterEntry>> {
    println!("Choose companies to load:");
    for (i, entry) in ROSTER.iter().enumerate() {
        println!("  {}: {}", i + 1, entry.name);
    }

    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Company numbers, comma-separated (e.g. 1,3,5)")
        .validate_with(|input: &String| parse_selection(input, ROSTER.len()).map(|_| ()))
        .interact_text()?;

    Ok(select_companies(&answer)?)
}

pub fn ask_keyword() -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Keyword to search vacancies (empty for all)")
        .allow_empty(true)
        .interact_text()?)
}
