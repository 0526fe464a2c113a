use serde_json::Value;
use sqlx::PgConnection;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Employer {
    pub employer_id: String,
    pub employer_name: String,
    pub employer_url: String,
}

/// Row of the per-employer vacancy count report.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmployerVacancyCount {
    pub employer_name: String,
    pub vacancy_count: i64,
}

impl Employer {
    /// Build an employer from an `/employers/{id}` payload.
    /// Returns None when the id or name is missing.
    pub fn from_api(raw: &Value) -> Option<Employer> {
        let employer_id = id_string(raw.get("id")?)?;
        let employer_name = raw.get("name").and_then(|v| v.as_str())?.to_string();
        let employer_url = raw
            .get("alternate_url")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Some(Employer {
            employer_id,
            employer_name,
            employer_url,
        })
    }

    /// Insert unless the id is already stored. Returns whether a row was written.
    pub async fn insert(conn: &mut PgConnection, employer: &Employer) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO employers (employer_id, employer_name, employer_url) VALUES ($1, $2, $3) ON CONFLICT (employer_id) DO NOTHING",
        )
        .bind(&employer.employer_id)
        .bind(&employer.employer_name)
        .bind(&employer.employer_url)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// API identifiers are strings, but tolerate bare numbers.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
