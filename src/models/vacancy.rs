use serde_json::Value;
use sqlx::PgConnection;

use crate::error::AppError;
use crate::models::employer::id_string;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Vacancy {
    pub vacancy_id: String,
    pub employer_id: String,
    pub vacancy_name: String,
    pub city: String,
    pub vacancy_url: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
}

/// Vacancy joined with its employer name, as listed by the "all vacancies" report.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VacancyListing {
    pub employer_name: Option<String>,
    pub vacancy_name: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub vacancy_url: String,
}

impl Vacancy {
    /// Build a vacancy from one item of a `/vacancies` page.
    /// A null `salary` object leaves both bounds unset.
    pub fn from_api(raw: &Value) -> Option<Vacancy> {
        let vacancy_id = id_string(raw.get("id")?)?;
        let employer_id = id_string(raw.get("employer")?.get("id")?)?;
        let vacancy_name = raw.get("name").and_then(|v| v.as_str())?.to_string();

        let city = raw
            .get("area")
            .and_then(|a| a.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let vacancy_url = raw
            .get("alternate_url")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let (salary_from, salary_to) = extract_salary(raw.get("salary"));

        Some(Vacancy {
            vacancy_id,
            employer_id,
            vacancy_name,
            city,
            vacancy_url,
            salary_from,
            salary_to,
        })
    }

    /// Insert unless the id is already stored. Returns whether a row was written.
    pub async fn insert(conn: &mut PgConnection, vacancy: &Vacancy) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO vacancies (vacancy_id, employer_id, vacancy_name, city, vacancy_url, salary_from, salary_to) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (vacancy_id) DO NOTHING",
        )
        .bind(&vacancy.vacancy_id)
        .bind(&vacancy.employer_id)
        .bind(&vacancy.vacancy_name)
        .bind(&vacancy.city)
        .bind(&vacancy.vacancy_url)
        .bind(vacancy.salary_from)
        .bind(vacancy.salary_to)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

fn extract_salary(salary: Option<&Value>) -> (Option<i32>, Option<i32>) {
    let Some(salary) = salary.filter(|s| s.is_object()) else {
        return (None, None);
    };
    let bound = |key: &str| {
        salary
            .get(key)
            .and_then(|v| v.as_f64())
            .map(|v| v as i32)
    };
    (bound("from"), bound("to"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_nested_fields() {
        let raw = json!({
            "id": "93000001",
            "name": "Rust Engineer",
            "employer": {"id": "1740", "name": "Acme"},
            "area": {"id": "1", "name": "Moscow"},
            "alternate_url": "https://hh.ru/vacancy/93000001",
            "salary": {"from": 100000, "to": 200000, "currency": "RUR"}
        });
        let vacancy = Vacancy::from_api(&raw).unwrap();
        assert_eq!(vacancy.vacancy_id, "93000001");
        assert_eq!(vacancy.employer_id, "1740");
        assert_eq!(vacancy.vacancy_name, "Rust Engineer");
        assert_eq!(vacancy.city, "Moscow");
        assert_eq!(vacancy.vacancy_url, "https://hh.ru/vacancy/93000001");
        assert_eq!(vacancy.salary_from, Some(100000));
        assert_eq!(vacancy.salary_to, Some(200000));
    }

    #[test]
    fn null_salary_leaves_both_bounds_unset() {
        let raw = json!({
            "id": "1",
            "name": "Courier",
            "employer": {"id": "2"},
            "area": {"name": "Kazan"},
            "alternate_url": "v.url",
            "salary": null
        });
        let vacancy = Vacancy::from_api(&raw).unwrap();
        assert_eq!(vacancy.salary_from, None);
        assert_eq!(vacancy.salary_to, None);
    }

    #[test]
    fn open_ended_salary_keeps_one_bound() {
        let raw = json!({
            "id": "1",
            "name": "Courier",
            "employer": {"id": "2"},
            "salary": {"from": null, "to": 50000}
        });
        let vacancy = Vacancy::from_api(&raw).unwrap();
        assert_eq!(vacancy.salary_from, None);
        assert_eq!(vacancy.salary_to, Some(50000));
        assert_eq!(vacancy.city, "");
    }

    #[test]
    fn vacancy_without_employer_is_rejected() {
        assert!(Vacancy::from_api(&json!({"id": "1", "name": "Courier"})).is_none());
    }
}
