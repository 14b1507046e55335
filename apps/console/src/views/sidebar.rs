use clap::ValueEnum;
use comfy_table::{Cell, Table};
use shared_types::CompanySummary;

use super::render::{flag_cell, new_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TargetFilter {
    #[default]
    All,
    Target,
    NonTarget,
}

impl TargetFilter {
    fn admits(self, is_target: bool) -> bool {
        match self {
            TargetFilter::All => true,
            TargetFilter::Target => is_target,
            TargetFilter::NonTarget => !is_target,
        }
    }
}

/// Companies matching the target filter whose name contains `search`,
/// case-insensitively. Server order is kept.
pub fn filter_companies<'a>(
    companies: &'a [CompanySummary],
    search: Option<&str>,
    filter: TargetFilter,
) -> Vec<&'a CompanySummary> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    companies
        .iter()
        .filter(|c| filter.admits(c.is_target))
        .filter(|c| match &needle {
            Some(needle) => c.company_name_clean.to_lowercase().contains(needle),
            None => true,
        })
        .collect()
}

pub fn sidebar_table(companies: &[&CompanySummary]) -> Table {
    let mut table = new_table(vec!["ID".into(), "Company".into(), "Target".into()]);
    for company in companies {
        table.add_row(vec![
            Cell::new(company.company_id),
            Cell::new(&company.company_name_clean),
            flag_cell(company.is_target),
        ]);
    }
    table
}
