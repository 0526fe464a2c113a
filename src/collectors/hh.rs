use serde_json::{Map, Value};

use crate::collectors::{ReqwestTransport, Transport};
use crate::error::AppError;

const BASE_URL: &str = "https://api.hh.ru";
const USER_AGENT: &str = "HH-User-Agent";

/// Area code for all regions of Russia.
const AREA_RUSSIA: &str = "113";
const VACANCIES_PER_PAGE: u32 = 100;
const MAX_TOP_EMPLOYERS: i64 = 100;

pub const DEFAULT_MAX_PAGES: u32 = 20;

type Params = Vec<(String, String)>;

fn params<const N: usize>(pairs: [(&str, String); N]) -> Params {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Client for the public HeadHunter API.
pub struct HhClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl HhClient<ReqwestTransport> {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: Transport> HhClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: BASE_URL.to_string(),
        }
    }

    /// GET `{base_url}{endpoint}` and return the decoded JSON object.
    pub async fn connect(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Map<String, Value>, AppError> {
        let url = format!("{}{endpoint}", self.base_url);
        tracing::debug!(%url, ?query, "GET");

        let resp = self
            .transport
            .get(&url, &[("User-Agent", USER_AGENT)], query)
            .await?;

        if resp.status != 200 {
            return Err(AppError::Api {
                status: resp.status,
                body: resp.body,
            });
        }

        let data: Value = serde_json::from_str(&resp.body)
            .map_err(|e| AppError::Request(format!("Failed to parse response: {e}")))?;

        match data {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::NotAMapping),
        }
    }

    /// Fetch every vacancy of an employer, one page of 100 at a time.
    /// Stops at the first empty page or after `max_pages` pages.
    pub async fn get_vacancies_by_employer_id(
        &self,
        employer_id: &str,
        max_pages: u32,
    ) -> Result<Vec<Value>, AppError> {
        let mut vacancies = Vec::new();

        for page in 0..max_pages {
            let query = params([
                ("text", String::new()),
                ("employer_id", employer_id.to_string()),
                ("page", page.to_string()),
                ("per_page", VACANCIES_PER_PAGE.to_string()),
            ]);
            let data = self.connect("/vacancies", &query).await?;
            let items = take_items(data);
            if items.is_empty() {
                break;
            }
            vacancies.extend(items);
        }

        tracing::debug!(employer_id, count = vacancies.len(), "Fetched vacancies");
        Ok(vacancies)
    }

    pub async fn get_employer_by_id(
        &self,
        employer_id: &str,
    ) -> Result<Map<String, Value>, AppError> {
        self.connect(&format!("/employers/{employer_id}"), &[]).await
    }

    /// Search employers with active vacancies in Russia. Single page.
    pub async fn search_employers_by_keyword(&self, keyword: &str) -> Result<Vec<Value>, AppError> {
        let query = params([
            ("text", keyword.to_string()),
            ("only_with_vacancies", "true".to_string()),
            ("area", AREA_RUSSIA.to_string()),
        ]);
        let data = self.connect("/employers", &query).await?;
        Ok(take_items(data))
    }

    /// Employers ranked by number of open vacancies, largest first.
    pub async fn get_top_employers(&self, top_n: i64) -> Result<Vec<Value>, AppError> {
        if !(1..=MAX_TOP_EMPLOYERS).contains(&top_n) {
            return Err(AppError::OutOfRange(top_n));
        }

        let query = params([
            ("per_page", top_n.to_string()),
            ("sort_by", "by_vacancies_open".to_string()),
            ("area", AREA_RUSSIA.to_string()),
        ]);
        let data = self.connect("/employers", &query).await?;
        Ok(take_items(data))
    }
}

/// Parse a user-supplied employer count.
pub fn parse_top_n(input: &str) -> Result<i64, AppError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::NotAnInteger(input.to_string()))
}

fn take_items(mut data: Map<String, Value>) -> Vec<Value> {
    match data.remove("items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
