//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    discounts::book::DiscountBook,
    pricing::cart::{CartDiscountApplied, CartResolution, LineResolution},
    products::ProductKey,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error finding a product in the catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable receipt for a resolved cart.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'r, 'a> {
    resolution: &'r CartResolution<'a>,
}

impl<'r, 'a> Receipt<'r, 'a> {
    /// Create a receipt for a resolved cart.
    #[must_use]
    pub fn new(resolution: &'r CartResolution<'a>) -> Self {
        Self { resolution }
    }

    /// Total listed price
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.resolution.subtotal()
    }

    /// Total amount to pay
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.resolution.total()
    }

    /// Amount saved by discounts
    #[must_use]
    pub fn savings(&self) -> Money<'a, Currency> {
        self.resolution.savings()
    }

    /// Savings as a fraction of the subtotal.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        ratio(self.savings(), self.subtotal())
    }

    /// Name of the discount applied to the whole cart, if any.
    #[must_use]
    pub fn cart_discount_name<'d>(&self, discounts: &'d DiscountBook<'_>) -> Option<&'d str> {
        match self.resolution.applied() {
            CartDiscountApplied::Threshold(key) => discounts.cart(key).map(|d| d.name()),
            CartDiscountApplied::Set(key) => discounts.set(key).map(|d| d.name()),
            CartDiscountApplied::PerItem => None,
        }
    }

    /// Writes the receipt as a table followed by a summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a cart product is missing from the catalog or writing
    /// fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        catalog: &Catalog<'_>,
        discounts: &DiscountBook<'_>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Price", "Discounted Price", "Savings", "Discount"]);

        let cart_discount = self.cart_discount_name(discounts);

        for (idx, (product, line)) in self.resolution.iter().enumerate() {
            let name = catalog
                .product(*product)
                .map(|p| p.name.as_str())
                .ok_or(ReceiptError::MissingProduct(*product))?;

            let discount = cart_discount
                .or_else(|| {
                    line.item_discount
                        .and_then(|key| discounts.item(key))
                        .map(|d| d.name())
                })
                .unwrap_or_default();

            let (final_price, savings) = line_cells(line);

            builder.push_record([
                format!("#{:<3}", idx + 1),
                name.to_string(),
                format!("{}", line.original),
                final_price,
                savings,
                discount.to_string(),
            ]);
        }

        write_receipt_table(&mut out, builder)?;

        write_receipt_summary(&mut out, self, cart_discount)
    }
}

fn line_cells(line: &LineResolution<'_>) -> (String, String) {
    if line.price == line.original {
        return (String::new(), String::new());
    }

    let savings = Money::from_minor(
        line.original.to_minor_units() - line.price.to_minor_units(),
        line.original.currency(),
    );

    let points = percent_points_from_fractional_percentage(ratio(savings, line.original));

    (format!("{}", line.price), format!("({points:.2}%) -{savings}"))
}

fn ratio(part: Money<'_, Currency>, whole: Money<'_, Currency>) -> Percentage {
    let whole = whole.to_minor_units();

    if whole == 0 {
        return Percentage::from(0.0);
    }

    let part = Decimal::from_i64(part.to_minor_units()).unwrap_or(Decimal::ZERO);
    let whole = Decimal::from_i64(whole).unwrap_or(Decimal::ONE);

    Percentage::from(part / whole)
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Columns::new(3..4), Color::FG_GREEN);

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_, '_>,
    cart_discount: Option<&str>,
) -> Result<(), ReceiptError> {
    let savings_percent_points =
        percent_points_from_fractional_percentage(receipt.savings_percent());

    let subtotal_label = " Subtotal:";
    let total_label = " \x1b[1mTotal:\x1b[0m";
    let savings_label = " Savings:";
    let discount_label = " Cart discount:";

    let subtotal_val = format!("{}  ", receipt.subtotal());
    let total_val = format!("{}  ", receipt.total());
    let savings_val = format!("({savings_percent_points:.2}%) {}  ", receipt.savings());
    let discount_val = format!("{}  ", cart_discount.unwrap_or("none"));

    let label_width = visible_width(subtotal_label)
        .max(visible_width(total_label))
        .max(visible_width(savings_label))
        .max(visible_width(discount_label));

    let value_width = subtotal_val
        .len()
        .max(total_val.len())
        .max(savings_val.len())
        .max(discount_val.len());

    write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    write_summary_line(out, savings_label, &savings_val, label_width, value_width)?;
    write_summary_line(out, discount_label, &discount_val, label_width, value_width)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
