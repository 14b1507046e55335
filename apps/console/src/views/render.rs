//! Shared table styling and status lines.

use std::fmt::Display;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub fn new_table(headers: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| header_cell(h)));
    table
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

/// Text cell, or a dimmed `-` when the value is missing or blank.
pub fn text_cell<S: AsRef<str>>(value: Option<S>) -> Cell {
    match value.as_ref().map(|v| v.as_ref().trim()).filter(|v| !v.is_empty()) {
        Some(v) => Cell::new(v),
        None => dim_cell("-"),
    }
}

pub fn opt_cell<T: Display>(value: Option<T>) -> Cell {
    match value {
        Some(v) => Cell::new(v.to_string()),
        None => dim_cell("-"),
    }
}

pub fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("Yes").fg(Color::Green)
    } else {
        dim_cell("No")
    }
}

/// Revenue with its scale suffix, e.g. `12.5 B`.
pub fn revenue_text(amount: Option<f64>, scale: Option<&str>) -> Option<String> {
    let amount = amount?;
    let scale = scale.map(str::trim).filter(|s| !s.is_empty());
    Some(match scale {
        Some(scale) => format!("{amount} {scale}"),
        None => amount.to_string(),
    })
}

pub fn success_line(message: &str) -> String {
    format!("✔ {message}")
}

pub fn error_line(message: &str) -> String {
    format!("✖ {message}")
}

pub fn print_success(message: &str) {
    println!("{}", success_line(message));
}

pub fn print_error(message: &str) {
    eprintln!("{}", error_line(message));
}
