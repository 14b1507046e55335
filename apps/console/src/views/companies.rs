use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, Table};
use shared_types::{Company, CompanyContact, CompanyListing};

use super::render::{align_column, flag_cell, new_table, opt_cell, revenue_text, text_cell};
use super::sort::{Column, Direction, SortState, SortValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompanyColumn {
    Name,
    Headquarters,
    Size,
    Revenue,
    Target,
    Applications,
    Contacts,
}

impl CompanyColumn {
    const ALL: [CompanyColumn; 7] = [
        CompanyColumn::Name,
        CompanyColumn::Headquarters,
        CompanyColumn::Size,
        CompanyColumn::Revenue,
        CompanyColumn::Target,
        CompanyColumn::Applications,
        CompanyColumn::Contacts,
    ];
}

impl Column<CompanyListing> for CompanyColumn {
    fn key(self, row: &CompanyListing) -> SortValue {
        match self {
            CompanyColumn::Name => SortValue::text(Some(&row.company_name_clean)),
            CompanyColumn::Headquarters => SortValue::text(row.headquarters.as_deref()),
            CompanyColumn::Size => SortValue::number(row.size_employees.map(f64::from)),
            CompanyColumn::Revenue => SortValue::number(row.annual_revenue),
            CompanyColumn::Target => SortValue::number(Some(if row.target_interest { 1.0 } else { 0.0 })),
            CompanyColumn::Applications => SortValue::number(Some(row.application_count as f64)),
            CompanyColumn::Contacts => SortValue::number(Some(row.contact_count as f64)),
        }
    }

    fn label(self) -> &'static str {
        match self {
            CompanyColumn::Name => "Company",
            CompanyColumn::Headquarters => "Headquarters",
            CompanyColumn::Size => "Employees",
            CompanyColumn::Revenue => "Revenue",
            CompanyColumn::Target => "Target",
            CompanyColumn::Applications => "Applications",
            CompanyColumn::Contacts => "Contacts",
        }
    }
}

/// Name ascending; other columns also start ascending.
pub fn default_sort() -> SortState<CompanyColumn> {
    SortState::new(CompanyColumn::Name, Direction::Asc, Direction::Asc)
}

pub fn company_table(rows: &mut [CompanyListing], sort: &SortState<CompanyColumn>) -> Table {
    sort.sort(rows);

    let headers = CompanyColumn::ALL.iter().map(|c| sort.header::<CompanyListing>(*c)).collect();
    let mut table = new_table(headers);
    for row in rows.iter() {
        table.add_row(vec![
            Cell::new(format!("{} (#{})", row.company_name_clean, row.company_id)),
            text_cell(row.headquarters.as_deref()),
            opt_cell(row.size_employees),
            opt_cell(revenue_text(row.annual_revenue, row.revenue_scale.as_deref())),
            flag_cell(row.target_interest),
            opt_cell(Some(row.application_count)),
            opt_cell(Some(row.contact_count)),
        ]);
    }
    for index in [2, 3, 5, 6] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table
}

pub fn profile_table(company: &Company) -> Table {
    let mut table = new_table(vec!["Field".into(), "Value".into()]);
    table.add_row(vec![Cell::new("ID"), Cell::new(company.company_id)]);
    table.add_row(vec![Cell::new("Name"), text_cell(Some(&company.company_name_clean))]);
    table.add_row(vec![Cell::new("Target"), flag_cell(company.target_interest)]);
    table.add_row(vec![Cell::new("Headquarters"), text_cell(company.headquarters.as_deref())]);
    table.add_row(vec![Cell::new("Employees"), opt_cell(company.size_employees)]);
    table.add_row(vec![
        Cell::new("Revenue"),
        opt_cell(revenue_text(company.annual_revenue, company.revenue_scale.as_deref())),
    ]);
    table.add_row(vec![Cell::new("Notes"), text_cell(company.notes.as_deref())]);
    table
}

pub fn raw_names_table(raw_names: &[String]) -> Table {
    let mut table = new_table(vec!["Mapped raw names".into()]);
    for name in raw_names {
        table.add_row(vec![text_cell(Some(name))]);
    }
    table
}

pub fn contacts_table(contacts: &[CompanyContact]) -> Table {
    let mut table = new_table(
        ["Name", "Position", "Email", "Connected", "Via"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    for contact in contacts {
        let name = contact.full_name();
        table.add_row(vec![
            text_cell(Some(&name)),
            text_cell(contact.position.as_deref()),
            text_cell(contact.email_address.as_deref()),
            opt_cell(contact.connected_on),
            text_cell(Some(&contact.associated_raw_name)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: i32, name: &str, contacts: i64) -> CompanyListing {
        CompanyListing {
            company_id: id,
            company_name_clean: name.to_string(),
            headquarters: None,
            size_employees: None,
            target_interest: false,
            annual_revenue: None,
            revenue_scale: None,
            application_count: 0,
            contact_count: contacts,
        }
    }

    fn ids(rows: &[CompanyListing]) -> Vec<i32> {
        rows.iter().map(|r| r.company_id).collect()
    }

    #[test]
    fn test_default_sort_is_name_ascending() {
        let mut rows = vec![listing(1, "zeta", 0), listing(2, "Acme", 0), listing(3, "beta", 0)];
        company_table(&mut rows, &default_sort());
        assert_eq!(ids(&rows), [2, 3, 1]);
    }

    #[test]
    fn test_sort_by_contact_count_both_directions() {
        let mut rows = vec![
            listing(1, "a", 5),
            listing(2, "b", 0),
            listing(3, "c", 5),
            listing(4, "d", 2),
        ];
        let mut sort = default_sort();
        sort.select(CompanyColumn::Contacts);
        company_table(&mut rows, &sort);
        assert_eq!(ids(&rows), [2, 4, 1, 3]);

        sort.select(CompanyColumn::Contacts);
        company_table(&mut rows, &sort);
        assert_eq!(ids(&rows), [1, 3, 4, 2]);
    }

    #[test]
    fn test_missing_size_sorts_as_zero() {
        let mut big = listing(1, "big", 0);
        big.size_employees = Some(500);
        let mut rows = vec![big, listing(2, "unknown", 0)];
        let mut sort = default_sort();
        sort.select(CompanyColumn::Size);
        company_table(&mut rows, &sort);
        assert_eq!(ids(&rows), [2, 1]);
    }
}
