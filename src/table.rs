// Fixed-width quota table with 1-based row numbers.
//
// The table keeps the rows it displayed, in display order, so that a row
// number typed by the operator maps back to exactly the record shown.

use crate::model::{Quota, Thresholds};
use crate::size::format_size;
use crossterm::style::Stylize;
use std::io::{self, Write};

/// What one table row shows.
pub struct Row<'a> {
    pub kind: &'a str,
    pub path: &'a str,
    pub thresholds: Thresholds,
    pub logical: Option<u64>,
    pub efficiency: Option<f64>,
}

/// Anything that can be shown as a quota table row.
pub trait Tabulate {
    fn row(&self) -> Row<'_>;
}

impl Tabulate for Quota {
    fn row(&self) -> Row<'_> {
        Row {
            kind: &self.kind,
            path: &self.path,
            thresholds: self.thresholds,
            logical: self.usage.map(|u| u.logical),
            efficiency: self.efficiency(),
        }
    }
}

pub struct QuotaTable<'a, T> {
    rows: Vec<&'a T>,
    color: bool,
}

impl<'a, T: Tabulate> QuotaTable<'a, T> {
    /// Keep the items whose path contains `filter` (case-insensitive), in
    /// their original order. No filter keeps everything.
    pub fn new(items: &'a [T], filter: Option<&str>) -> Self {
        let filter = filter.map(str::to_lowercase).filter(|f| !f.is_empty());
        let rows = items
            .iter()
            .filter(|item| match &filter {
                Some(f) => item.row().path.to_lowercase().contains(f.as_str()),
                None => true,
            })
            .collect();
        QuotaTable { rows, color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Item shown as row `number` (1-based).
    pub fn select(&self, number: usize) -> Option<&'a T> {
        number.checked_sub(1).and_then(|i| self.rows.get(i)).copied()
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let header = format!(
            "{:>3} {:<9} {:<80} {:>7} {:>7} {:>7} {:>7}   {}",
            "Num", "Type", "Path", "Hard", "Soft", "Adv", "Used", "Efficiency"
        );
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "-".repeat(header.len()))?;
        for (i, item) in self.rows.iter().enumerate() {
            let row = item.row();
            writeln!(
                out,
                "{:>3} {} {:<80} {:>7} {:>7} {:>7} {:>7}   {:.2}:1",
                i + 1,
                self.kind_cell(row.kind),
                row.path,
                format_size(row.thresholds.hard),
                format_size(row.thresholds.soft),
                format_size(row.thresholds.advisory),
                format_size(row.logical),
                // no usage data reads as no data reduction
                row.efficiency.unwrap_or(1.0),
            )?;
        }
        Ok(())
    }

    fn kind_cell(&self, kind: &str) -> String {
        let cell = format!("{:<9}", kind);
        if !self.color {
            return cell;
        }
        match kind {
            "directory" => cell.green().to_string(),
            "missing" => cell.yellow().to_string(),
            _ => cell.red().to_string(),
        }
    }
}
