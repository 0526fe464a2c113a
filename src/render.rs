use crate::models::employer::{Employer, EmployerVacancyCount};
use crate::models::vacancy::{Vacancy, VacancyListing};

pub const NO_DATA: &str = "No data to display.";

/// A record that can be printed as one line of a text table.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Employer {
    fn headers() -> &'static [&'static str] {
        &["employer_id", "employer_name", "employer_url"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.employer_id.clone(),
            self.employer_name.clone(),
            self.employer_url.clone(),
        ]
    }
}

impl TableRow for EmployerVacancyCount {
    fn headers() -> &'static [&'static str] {
        &["employer_name", "vacancy_count"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.employer_name.clone(), self.vacancy_count.to_string()]
    }
}

impl TableRow for VacancyListing {
    fn headers() -> &'static [&'static str] {
        &[
            "employer_name",
            "vacancy_name",
            "salary_from",
            "salary_to",
            "vacancy_url",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.employer_name.clone().unwrap_or_default(),
            self.vacancy_name.clone(),
            optional(self.salary_from),
            optional(self.salary_to),
            self.vacancy_url.clone(),
        ]
    }
}

impl TableRow for Vacancy {
    fn headers() -> &'static [&'static str] {
        &[
            "vacancy_id",
            "employer_id",
            "vacancy_name",
            "city",
            "vacancy_url",
            "salary_from",
            "salary_to",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.vacancy_id.clone(),
            self.employer_id.clone(),
            self.vacancy_name.clone(),
            self.city.clone(),
            self.vacancy_url.clone(),
            optional(self.salary_from),
            optional(self.salary_to),
        ]
    }
}

fn optional(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render rows under a header line, each column padded to its widest cell.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    if rows.is_empty() {
        return NO_DATA.to_string();
    }

    let headers = R::headers();
    let body: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format_line(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &body {
        lines.push(format_line(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| {
            let pad = width - cell.chars().count();
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_render_placeholder() {
        let rows: Vec<EmployerVacancyCount> = Vec::new();
        assert_eq!(render_table(&rows), NO_DATA);
    }

    #[test]
    fn columns_pad_to_widest_cell() {
        let rows = vec![
            EmployerVacancyCount {
                employer_name: "Acme".to_string(),
                vacancy_count: 1,
            },
            EmployerVacancyCount {
                employer_name: "Globex Corporation".to_string(),
                vacancy_count: 120,
            },
        ];
        let expected = [
            "employer_name       vacancy_count",
            "------------------  -------------",
            "Acme                1",
            "Globex Corporation  120",
        ]
        .join("\n");
        assert_eq!(render_table(&rows), expected);
    }

    #[test]
    fn missing_salary_renders_blank() {
        let rows = vec![VacancyListing {
            employer_name: None,
            vacancy_name: "Курьер".to_string(),
            salary_from: None,
            salary_to: Some(5),
            vacancy_url: "u".to_string(),
        }];
        let table = render_table(&rows);
        let last = table.lines().last().unwrap();
        let expected = format!("{}Курьер{}5{}u", " ".repeat(15), " ".repeat(21), " ".repeat(10));
        assert_eq!(last, expected);
    }
}
