use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, Color, Table};
use shared_types::{Application, ApplicationStatus};

use super::render::{align_column, dim_cell, new_table, opt_cell, text_cell};
use super::sort::{Column, Direction, SortState, SortValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApplicationColumn {
    Company,
    Title,
    Date,
    Status,
    Documents,
    Contacts,
    Updated,
}

impl ApplicationColumn {
    const ALL: [ApplicationColumn; 7] = [
        ApplicationColumn::Company,
        ApplicationColumn::Title,
        ApplicationColumn::Date,
        ApplicationColumn::Status,
        ApplicationColumn::Documents,
        ApplicationColumn::Contacts,
        ApplicationColumn::Updated,
    ];
}

impl Column<Application> for ApplicationColumn {
    fn key(self, row: &Application) -> SortValue {
        match self {
            ApplicationColumn::Company => SortValue::text(Some(row.company_name())),
            ApplicationColumn::Title => SortValue::text(Some(row.job_title())),
            ApplicationColumn::Date => SortValue::date(Some(row.date_applied)),
            ApplicationColumn::Status => SortValue::text(Some(row.current_status.as_str())),
            ApplicationColumn::Documents => SortValue::number(Some(row.documents.len() as f64)),
            ApplicationColumn::Contacts => SortValue::number(row.contact_count.map(|n| n as f64)),
            ApplicationColumn::Updated => SortValue::timestamp(row.updated_at),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ApplicationColumn::Company => "Company",
            ApplicationColumn::Title => "Job title",
            ApplicationColumn::Date => "Applied",
            ApplicationColumn::Status => "Status",
            ApplicationColumn::Documents => "Documents",
            ApplicationColumn::Contacts => "Contacts",
            ApplicationColumn::Updated => "Updated",
        }
    }
}

/// Newest applications first; other columns also start descending.
pub fn default_sort() -> SortState<ApplicationColumn> {
    SortState::new(ApplicationColumn::Date, Direction::Desc, Direction::Desc)
}

fn status_cell(status: ApplicationStatus) -> Cell {
    let color = match status {
        ApplicationStatus::New => Color::Blue,
        ApplicationStatus::Applied => Color::Cyan,
        ApplicationStatus::Interviewing => Color::Yellow,
        ApplicationStatus::Offer => Color::Green,
        ApplicationStatus::Rejected => Color::Red,
        ApplicationStatus::Withdrawn => Color::DarkGrey,
    };
    Cell::new(status.as_str()).fg(color)
}

pub fn dashboard_table(rows: &mut [Application], sort: &SortState<ApplicationColumn>) -> Table {
    sort.sort(rows);

    let headers = ApplicationColumn::ALL.iter().map(|c| sort.header::<Application>(*c)).collect();
    let mut table = new_table(headers);
    for app in rows.iter() {
        table.add_row(vec![
            text_cell(Some(app.company_name())),
            text_cell(Some(app.job_title())),
            Cell::new(app.date_applied),
            status_cell(app.current_status),
            Cell::new(app.documents.len()),
            opt_cell(app.contact_count),
            opt_cell(app.updated_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        ]);
    }
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    table
}

pub fn review_table(app: &Application) -> Table {
    let mut table = new_table(vec!["Field".into(), "Value".into()]);
    table.add_row(vec![Cell::new("ID"), Cell::new(app.application_id)]);
    table.add_row(vec![Cell::new("Company"), text_cell(Some(app.company_name()))]);
    table.add_row(vec![Cell::new("Job title"), text_cell(Some(app.job_title()))]);
    table.add_row(vec![Cell::new("Applied"), Cell::new(app.date_applied)]);
    table.add_row(vec![Cell::new("Status"), status_cell(app.current_status)]);
    table.add_row(vec![Cell::new("Posting"), text_cell(app.job_posting_url.as_deref())]);
    table
}

pub fn attached_documents_table(app: &Application) -> Table {
    let mut table = new_table(vec!["Document".into(), "Type".into(), "File".into()]);
    if app.documents.is_empty() {
        table.add_row(vec![dim_cell("No documents attached"), dim_cell("-"), dim_cell("-")]);
    }
    for doc in &app.documents {
        table.add_row(vec![
            Cell::new(doc.document_id),
            Cell::new(&doc.document_type),
            text_cell(Some(&doc.original_filename)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shared_types::CompanyRef;
    use uuid::Uuid;

    use super::*;

    fn app(company: &str, date: (i32, u32, u32), contacts: Option<i64>) -> Application {
        Application {
            application_id: Uuid::new_v4(),
            date_applied: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            current_status: ApplicationStatus::Applied,
            job_posting_url: None,
            updated_at: None,
            company_info: Some(CompanyRef {
                company_id: 1,
                company_name_clean: company.to_string(),
            }),
            job_title_info: None,
            documents: Vec::new(),
            contact_count: contacts,
        }
    }

    fn companies(rows: &[Application]) -> Vec<&str> {
        rows.iter().map(|a| a.company_name()).collect()
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let mut rows = vec![
            app("old", (2023, 5, 1), None),
            app("new", (2024, 6, 1), None),
            app("mid", (2024, 1, 1), None),
        ];
        dashboard_table(&mut rows, &default_sort());
        assert_eq!(companies(&rows), ["new", "mid", "old"]);
    }

    #[test]
    fn test_new_column_starts_descending() {
        let mut rows = vec![
            app("a", (2024, 1, 1), Some(1)),
            app("b", (2024, 1, 2), None),
            app("c", (2024, 1, 3), Some(4)),
            app("d", (2024, 1, 4), Some(1)),
        ];
        let mut sort = default_sort();
        sort.select(ApplicationColumn::Contacts);
        assert_eq!(sort.direction, Direction::Desc);
        dashboard_table(&mut rows, &sort);
        assert_eq!(companies(&rows), ["c", "a", "d", "b"]);
    }

    #[test]
    fn test_missing_company_shows_placeholder() {
        let mut orphan = app("x", (2024, 1, 1), None);
        orphan.company_info = None;
        assert_eq!(orphan.company_name(), "Unknown/Unstandardized Company");
    }
}
