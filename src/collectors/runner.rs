use crate::collectors::Transport;
use crate::collectors::hh::HhClient;
use crate::db::DbManager;
use crate::error::AppError;
use crate::models::employer::{Employer, id_string};
use crate::models::vacancy::Vacancy;

/// Employers and vacancies fetched in one load, ready for insertion.
#[derive(Debug, Default)]
pub struct Collected {
    pub employers: Vec<Employer>,
    pub vacancies: Vec<Vacancy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub employers: usize,
    pub vacancies: usize,
}

/// Fetch the top employers, their full records, and all their vacancies.
/// Any API error aborts the whole collection.
pub async fn collect<T: Transport>(
    client: &HhClient<T>,
    top_n: i64,
    max_pages: u32,
) -> Result<Collected, AppError> {
    let top = client.get_top_employers(top_n).await?;
    tracing::info!("Found {} top employers", top.len());

    let mut collected = Collected::default();
    for entry in &top {
        let Some(employer_id) = entry.get("id").and_then(id_string) else {
            tracing::warn!("Skipping employer entry without id");
            continue;
        };

        let raw = serde_json::Value::Object(client.get_employer_by_id(&employer_id).await?);
        match Employer::from_api(&raw) {
            Some(employer) => collected.employers.push(employer),
            None => {
                tracing::warn!("Skipping malformed employer {employer_id}");
                continue;
            }
        }

        let items = client
            .get_vacancies_by_employer_id(&employer_id, max_pages)
            .await?;
        let before = collected.vacancies.len();
        collected
            .vacancies
            .extend(items.iter().filter_map(Vacancy::from_api));
        let parsed = collected.vacancies.len() - before;
        if parsed < items.len() {
            tracing::warn!(
                "Dropped {} malformed vacancies of employer {employer_id}",
                items.len() - parsed
            );
        }
        tracing::info!("Employer {employer_id}: {parsed} vacancies");
    }

    Ok(collected)
}

/// Store a collection. Employers go first so every vacancy finds its owner.
pub async fn store(db: &mut DbManager, collected: &Collected) -> Result<LoadSummary, AppError> {
    let employers = db.insert_employers(&collected.employers).await?;
    let vacancies = db.insert_vacancies(&collected.vacancies).await?;
    Ok(LoadSummary {
        employers,
        vacancies,
    })
}

pub async fn run<T: Transport>(
    client: &HhClient<T>,
    db: &mut DbManager,
    top_n: i64,
    max_pages: u32,
) -> Result<LoadSummary, AppError> {
    let collected = collect(client, top_n, max_pages).await?;
    let summary = store(db, &collected).await?;
    tracing::info!(
        "Load completed: {} employers, {} vacancies",
        summary.employers,
        summary.vacancies
    );
    Ok(summary)
}
