use colored::Colorize;
use itertools::Itertools;

use crate::{portfolio::Portfolio, stock::Stock};

pub trait PortfolioDisplay {
    /// Called with the stock whose write triggered the refresh, right before
    /// `print_information`.
    fn value_changed(&self, _stock: &Stock) {}

    fn print_information(&self, portfolio: &Portfolio);
}

pub fn describe_change(stock: &Stock) -> String {
    format!("- {} changed to {}", stock.name(), stock.value())
}

/// Formats a computed total, or `overflow` when it could not be represented.
pub(crate) fn format_total(value: Option<rust_decimal::Decimal>) -> String {
    value.map_or_else(|| String::from("overflow"), |value| value.to_string())
}

const HEADERS: [&str; 4] = ["Name", "Value", "Amount", "Total"];

/// Renders a portfolio as a bordered table, one row per holding.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortfolioTable {
    highlight: bool,
}

impl PortfolioTable {
    pub fn plain() -> Self {
        Self { highlight: false }
    }

    pub fn highlighted() -> Self {
        Self { highlight: true }
    }

    pub fn render(&self, portfolio: &Portfolio) -> String {
        let rows: Vec<[String; 4]> = portfolio
            .holdings()
            .iter()
            .map(|holding| {
                [
                    holding.stock.name().to_string(),
                    holding.stock.value().to_string(),
                    holding.quantity.to_string(),
                    format_total(holding.total()),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|header| header.chars().count());
        for row in rows.iter() {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |cells: &[&str]| {
            let inner = cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| format!("{:^width$}", cell, width = *width))
                .join(" | ");
            format!("| {} |", inner)
        };
        let header = line(&HEADERS[..]);
        let border = "-".repeat(header.chars().count());

        let total = format_total(portfolio.total().ok());
        let total = if self.highlight {
            total.yellow().bold().to_string()
        } else {
            total
        };

        let mut lines = vec![
            format!("{} has {} in total stock value", portfolio.name(), total),
            String::from("List of Stock"),
            border.clone(),
            header,
            border.clone(),
        ];
        for row in rows.iter() {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            lines.push(line(&cells[..]));
            lines.push(border.clone());
        }
        lines.join("\n")
    }
}

/// Prints the table to stdout on every refresh.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleDisplay;

impl PortfolioDisplay for ConsoleDisplay {
    fn value_changed(&self, stock: &Stock) {
        println!("{}", describe_change(stock));
    }

    fn print_information(&self, portfolio: &Portfolio) {
        println!("Displaying current portfolio...");
        println!("{}", PortfolioTable::highlighted().render(portfolio));
        println!();
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentDisplay;

impl PortfolioDisplay for SilentDisplay {
    fn print_information(&self, _portfolio: &Portfolio) {}
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingDisplay {
    calls: std::cell::RefCell<Vec<(String, Option<rust_decimal::Decimal>)>>,
    changes: std::cell::RefCell<Vec<(String, rust_decimal::Decimal)>>,
}

#[cfg(test)]
impl RecordingDisplay {
    pub(crate) fn calls(&self) -> Vec<(String, Option<rust_decimal::Decimal>)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn changes(&self) -> Vec<(String, rust_decimal::Decimal)> {
        self.changes.borrow().clone()
    }
}

#[cfg(test)]
impl PortfolioDisplay for RecordingDisplay {
    fn value_changed(&self, stock: &Stock) {
        self.changes
            .borrow_mut()
            .push((stock.name().to_string(), stock.value()));
    }

    fn print_information(&self, portfolio: &Portfolio) {
        self.calls
            .borrow_mut()
            .push((portfolio.name().to_string(), portfolio.total().ok()));
    }
}
