use clap::ValueEnum;
use comfy_table::{Cell, Table};
use shared_types::DocumentListing;

use super::render::{new_table, text_cell};
use super::sort::{Column, Direction, SortState, SortValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentColumn {
    File,
    Type,
    Company,
    Uploaded,
}

impl DocumentColumn {
    const ALL: [DocumentColumn; 4] = [
        DocumentColumn::File,
        DocumentColumn::Type,
        DocumentColumn::Company,
        DocumentColumn::Uploaded,
    ];
}

impl Column<DocumentListing> for DocumentColumn {
    fn key(self, row: &DocumentListing) -> SortValue {
        match self {
            DocumentColumn::File => SortValue::text(Some(&row.original_filename)),
            DocumentColumn::Type => SortValue::text(Some(&row.document_type)),
            DocumentColumn::Company => SortValue::text(row.company_name_clean.as_deref()),
            DocumentColumn::Uploaded => SortValue::timestamp(Some(row.upload_timestamp)),
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentColumn::File => "File",
            DocumentColumn::Type => "Type",
            DocumentColumn::Company => "Company",
            DocumentColumn::Uploaded => "Uploaded",
        }
    }
}

/// Latest uploads first; other columns start ascending.
pub fn default_sort() -> SortState<DocumentColumn> {
    SortState::new(DocumentColumn::Uploaded, Direction::Desc, Direction::Asc)
}

pub fn dashboard_table(rows: &mut [DocumentListing], sort: &SortState<DocumentColumn>) -> Table {
    sort.sort(rows);

    let mut headers: Vec<String> = DocumentColumn::ALL.iter().map(|c| sort.header::<DocumentListing>(*c)).collect();
    headers.push("Document ID".into());
    let mut table = new_table(headers);
    for doc in rows.iter() {
        table.add_row(vec![
            text_cell(Some(&doc.original_filename)),
            Cell::new(&doc.document_type),
            text_cell(doc.company_name_clean.as_deref()),
            Cell::new(doc.upload_timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(doc.document_id),
        ]);
    }
    table
}
