use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Connection, Executor, PgConnection};

use crate::config::DbParams;
use crate::error::AppError;
use crate::models::employer::{Employer, EmployerVacancyCount};
use crate::models::vacancy::{Vacancy, VacancyListing};

const MAINTENANCE_DB: &str = "postgres";

/// Midpoint of the salary bounds, NULL unless both are set.
const MIDPOINT: &str = "(salary_from + salary_to) / 2.0";

const VACANCY_COLUMNS: &str =
    "vacancy_id, employer_id, vacancy_name, city, vacancy_url, salary_from, salary_to";

/// Data access for the employers and vacancies tables.
///
/// Every public operation opens its own connection and closes it before
/// returning, whether the statement succeeded or not. Failures are logged
/// here and returned to the caller.
pub struct DbManager {
    params: DbParams,
    conn: Option<PgConnection>,
}

impl DbManager {
    pub fn new(params: DbParams) -> Self {
        Self { params, conn: None }
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the connection unless one is already open.
    pub async fn connect(&mut self) -> Result<&mut PgConnection, AppError> {
        let conn = match self.conn.take() {
            Some(conn) => {
                tracing::info!("Connection already established");
                conn
            }
            None => PgConnection::connect_with(&self.params.connect_options())
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        host = %self.params.host,
                        dbname = %self.params.dbname,
                        "Connection failed: {e}"
                    )
                })?,
        };
        Ok(self.conn.insert(conn))
    }

    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take()
            && let Err(e) = conn.close().await
        {
            tracing::warn!("Failed to close connection cleanly: {e}");
        }
    }

    /// Every employer with the number of vacancies it has, zero included.
    pub async fn get_companies_and_vacancies_count(
        &mut self,
    ) -> Result<Vec<EmployerVacancyCount>, AppError> {
        let conn = self.connect().await?;
        let result = sqlx::query_as::<_, EmployerVacancyCount>(
            "SELECT employer_name, COUNT(vacancy_id) AS vacancy_count
             FROM employers
             LEFT JOIN vacancies USING (employer_id)
             GROUP BY employer_name",
        )
        .fetch_all(conn)
        .await;
        self.close().await;
        logged("get_companies_and_vacancies_count", result)
    }

    pub async fn get_all_vacancies(&mut self) -> Result<Vec<VacancyListing>, AppError> {
        let conn = self.connect().await?;
        let result = sqlx::query_as::<_, VacancyListing>(
            "SELECT employer_name, vacancy_name, salary_from, salary_to, vacancy_url
             FROM vacancies
             LEFT JOIN employers USING (employer_id)",
        )
        .fetch_all(conn)
        .await;
        self.close().await;
        logged("get_all_vacancies", result)
    }

    /// Average midpoint salary across all vacancies.
    /// Yields 0.0 when no vacancy has both bounds.
    pub async fn get_avg_salary(&mut self) -> Result<f64, AppError> {
        let sql = format!("SELECT AVG({MIDPOINT}) AS avg_salary FROM vacancies");
        let conn = self.connect().await?;
        let result = sqlx::query_scalar::<_, Option<Decimal>>(&sql)
            .fetch_one(conn)
            .await;
        self.close().await;
        match result {
            Ok(avg) => Ok(avg_to_f64(avg)),
            Err(sqlx::Error::ColumnDecode { source, .. }) => {
                tracing::warn!("Average salary is not a number: {source}");
                Ok(0.0)
            }
            Err(e) => logged("get_avg_salary", Err(e)),
        }
    }

    /// Vacancies whose midpoint salary is above the average midpoint.
    pub async fn get_vacancies_with_higher_salary(&mut self) -> Result<Vec<Vacancy>, AppError> {
        let sql = format!(
            "SELECT {VACANCY_COLUMNS}
             FROM vacancies
             WHERE {MIDPOINT} > (SELECT AVG({MIDPOINT}) FROM vacancies)"
        );
        let conn = self.connect().await?;
        let result = sqlx::query_as::<_, Vacancy>(&sql).fetch_all(conn).await;
        self.close().await;
        logged("get_vacancies_with_higher_salary", result)
    }

    /// Vacancies whose name contains every whitespace-separated keyword,
    /// ignoring case. Blank input matches nothing and never touches the database.
    pub async fn get_vacancies_with_keyword(
        &mut self,
        keywords: &str,
    ) -> Result<Vec<Vacancy>, AppError> {
        let tokens: Vec<&str> = keywords.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let sql = keyword_query(tokens.len());
        let mut query = sqlx::query_as::<_, Vacancy>(&sql);
        for token in &tokens {
            query = query.bind(like_pattern(token));
        }

        let conn = self.connect().await?;
        let result = query.fetch_all(conn).await;
        self.close().await;
        logged("get_vacancies_with_keyword", result)
    }

    /// Insert employers in one transaction, skipping ids already stored.
    /// Returns the number of new rows.
    pub async fn insert_employers(&mut self, employers: &[Employer]) -> Result<usize, AppError> {
        let conn = self.connect().await?;
        let result = async {
            let mut tx = conn.begin().await?;
            let mut inserted = 0;
            for employer in employers {
                if Employer::insert(&mut tx, employer).await? {
                    inserted += 1;
                }
            }
            tx.commit().await?;
            Ok::<_, AppError>(inserted)
        }
        .await;
        self.close().await;
        logged("insert_employers", result)
    }

    /// Insert vacancies in one transaction. Their employers must already be stored.
    /// Returns the number of new rows.
    pub async fn insert_vacancies(&mut self, vacancies: &[Vacancy]) -> Result<usize, AppError> {
        let conn = self.connect().await?;
        let result = async {
            let mut tx = conn.begin().await?;
            let mut inserted = 0;
            for vacancy in vacancies {
                if Vacancy::insert(&mut tx, vacancy).await? {
                    inserted += 1;
                }
            }
            tx.commit().await?;
            Ok::<_, AppError>(inserted)
        }
        .await;
        self.close().await;
        logged("insert_vacancies", result)
    }

    /// Create the configured database through the maintenance database if it
    /// does not exist yet. Returns true when it was created.
    pub async fn ensure_database(&self) -> Result<bool, AppError> {
        let dbname = &self.params.dbname;
        if dbname == MAINTENANCE_DB {
            return Ok(false);
        }

        let mut conn =
            PgConnection::connect_with(&self.params.connect_options_for(MAINTENANCE_DB))
                .await
                .inspect_err(|e| tracing::error!("Connection to {MAINTENANCE_DB} failed: {e}"))?;

        let result = async {
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
                    .bind(dbname)
                    .fetch_one(&mut conn)
                    .await?;
            if !exists {
                conn.execute(format!("CREATE DATABASE {}", quote_ident(dbname)).as_str())
                    .await?;
            }
            Ok::<_, AppError>(!exists)
        }
        .await;

        if let Err(e) = conn.close().await {
            tracing::warn!("Failed to close connection cleanly: {e}");
        }
        logged("ensure_database", result)
    }

    pub async fn run_migrations(&mut self) -> Result<(), AppError> {
        let conn = self.connect().await?;
        let result = sqlx::migrate!("./migrations").run(conn).await;
        self.close().await;
        logged("run_migrations", result)
    }
}

fn logged<T, E: Into<AppError>>(operation: &str, result: Result<T, E>) -> Result<T, AppError> {
    result.map_err(|e| {
        let e = e.into();
        tracing::error!(operation, "{e}");
        e
    })
}

/// NULL, or a value with no f64 form, degrades to 0.0.
fn avg_to_f64(avg: Option<Decimal>) -> f64 {
    let Some(avg) = avg else {
        return 0.0;
    };
    match avg.to_f64() {
        Some(value) if value.is_finite() => value,
        _ => {
            tracing::warn!(value = %avg, "Average salary is not a number");
            0.0
        }
    }
}

fn keyword_query(token_count: usize) -> String {
    let conditions = (1..=token_count)
        .map(|n| format!("LOWER(vacancy_name) LIKE LOWER(${n})"))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!("SELECT {VACANCY_COLUMNS} FROM vacancies WHERE {conditions}")
}

/// `%token%` with LIKE metacharacters escaped, so the token matches literally.
fn like_pattern(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    escaped.push('%');
    for c in token.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
