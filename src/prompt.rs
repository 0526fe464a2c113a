//! Interactive read-query session over the loaded data.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::db::DbManager;
use crate::error::AppError;
use crate::render::{TableRow, render_table};

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn show<R: TableRow>(result: Result<Vec<R>, AppError>) {
    match result {
        Ok(rows) => println!("{}", render_table(&rows)),
        Err(e) => println!("Query failed: {e}"),
    }
}

/// Ask which reports to show, one yes/no question per report.
pub async fn run(db: &mut DbManager) -> Result<()> {
    if confirm("Show employers with their vacancy counts?")? {
        show(db.get_companies_and_vacancies_count().await);
    }

    if confirm("Show all vacancies?")? {
        show(db.get_all_vacancies().await);
    }

    if confirm("Show the average salary?")? {
        match db.get_avg_salary().await {
            Ok(avg) => println!("{avg:.2}"),
            Err(e) => println!("Query failed: {e}"),
        }
    }

    if confirm("Show vacancies paying above average?")? {
        show(db.get_vacancies_with_higher_salary().await);
    }

    if confirm("Search vacancies by keywords?")? {
        let keywords: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Words to look for in vacancy names")
            .allow_empty(true)
            .interact_text()?;
        show(db.get_vacancies_with_keyword(&keywords).await);
    }

    Ok(())
}
