//! Client-side, comparator-based table sorting.
//!
//! Text compares case-insensitively, numbers numerically with missing values
//! as zero, dates chronologically with missing dates at the epoch. Sorting is
//! stable in both directions, so rows that tie keep their input order.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Direction::Asc => "▲",
            Direction::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
}

impl SortValue {
    pub fn text(value: Option<&str>) -> Self {
        SortValue::Text(value.unwrap_or_default().to_lowercase())
    }

    pub fn number(value: Option<f64>) -> Self {
        SortValue::Number(value.unwrap_or(0.0))
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        SortValue::Date(
            value
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or(0),
        )
    }

    pub fn timestamp(value: Option<DateTime<Utc>>) -> Self {
        SortValue::Date(value.map(|t| t.timestamp_millis()).unwrap_or(0))
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A sortable table column.
pub trait Column<Row>: Copy + PartialEq {
    fn key(self, row: &Row) -> SortValue;
    fn label(self) -> &'static str;
}

/// Current sort column and direction, with the view's toggle rule: picking
/// the current column flips direction, picking another column starts at
/// `new_column_direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortState<C> {
    pub column: C,
    pub direction: Direction,
    new_column_direction: Direction,
}

impl<C: Copy + PartialEq> SortState<C> {
    pub fn new(column: C, direction: Direction, new_column_direction: Direction) -> Self {
        Self {
            column,
            direction,
            new_column_direction,
        }
    }

    pub fn select(&mut self, column: C) {
        if column == self.column {
            self.direction = self.direction.toggled();
        } else {
            self.column = column;
            self.direction = self.new_column_direction;
        }
    }

    /// Applies a sequence of column picks, as if clicked in order.
    pub fn select_all(&mut self, columns: impl IntoIterator<Item = C>) {
        for column in columns {
            self.select(column);
        }
    }

    pub fn sort<Row>(&self, rows: &mut [Row])
    where
        C: Column<Row>,
    {
        let column = self.column;
        let direction = self.direction;
        rows.sort_by(|a, b| {
            let ordering = column.key(a).compare(&column.key(b));
            match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
    }

    /// Header label with the direction arrow on the active column.
    pub fn header<Row>(&self, column: C) -> String
    where
        C: Column<Row>,
    {
        if column == self.column {
            format!("{} {}", column.label(), self.direction.indicator())
        } else {
            column.label().to_string()
        }
    }
}
