//! Storefront CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jiff::{Zoned, civil::Date};
use storefront::pricing::{CartDiscountPolicy, ResolverConfig};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Fixture and resolver settings.
#[derive(Debug, Args)]
pub(crate) struct PricingConfig {
    /// Directory holding the `catalog`, `discounts` and `carts` fixture folders
    #[arg(long, env = "STOREFRONT_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Name of the catalog and discounts fixture set
    #[arg(long, env = "STOREFRONT_SET", default_value = "demo")]
    pub set: String,

    /// Evaluation date (YYYY-MM-DD); defaults to today
    #[arg(long, env = "STOREFRONT_DATE")]
    pub date: Option<Date>,

    /// Lowest price an amount-off discount may produce, in minor units; defaults to one unit
    /// of the catalog currency
    #[arg(long, env = "STOREFRONT_FLOOR_MINOR")]
    pub floor: Option<i64>,

    /// Fail cart pricing when no cart-level discount is eligible
    #[arg(long, env = "STOREFRONT_STRICT", default_value_t = false)]
    pub strict: bool,
}

impl PricingConfig {
    /// Evaluation date, falling back to today in the system time zone.
    pub fn date(&self) -> Date {
        self.date.unwrap_or_else(|| Zoned::now().date())
    }

    /// Resolver settings.
    pub fn resolver(&self) -> ResolverConfig {
        ResolverConfig {
            floor_minor: self.floor,
            cart_policy: if self.strict {
                CartDiscountPolicy::Strict
            } else {
                CartDiscountPolicy::Fallback
            },
        }
    }
}

/// Resolve one product's price.
#[derive(Debug, Args)]
pub(crate) struct PriceArgs {
    /// Product fixture key
    pub product: String,

    /// Known price (e.g. "12.50 GBP"); defaults to the highest offer
    #[arg(long, conflicts_with = "seller")]
    pub price: Option<String>,

    /// Price the product from this seller's offer
    #[arg(long)]
    pub seller: Option<String>,
}

/// Resolve a cart fixture and print a receipt.
#[derive(Debug, Args)]
pub(crate) struct CartArgs {
    /// Cart fixture name
    pub name: String,
}

/// List the catalog.
#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// Case-insensitive name substring
    #[arg(long)]
    pub name: Option<String>,

    /// Exact seller title
    #[arg(long)]
    pub seller: Option<String>,

    /// Category fixture key
    #[arg(long)]
    pub category: Option<String>,

    /// Lowest display price (e.g. "10.00 GBP")
    #[arg(long)]
    pub price_min: Option<String>,

    /// Highest display price
    #[arg(long)]
    pub price_max: Option<String>,

    /// Only products in stock
    #[arg(long)]
    pub in_stock: bool,

    /// Only products with free delivery
    #[arg(long)]
    pub free_delivery: bool,

    /// Sort field (price, name, sellers, reviews, newest)
    #[arg(long, default_value = "price")]
    pub sort: String,

    /// Sort direction (asc, desc)
    #[arg(long, default_value = "")]
    pub trend: String,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Products per page
    #[arg(long, default_value_t = 20)]
    pub per_page: usize,
}

/// Compare products side by side.
#[derive(Debug, Args)]
pub(crate) struct CompareArgs {
    /// Product fixture keys
    #[arg(required = true, num_args = 2..)]
    pub products: Vec<String>,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Resolve one product's price
    Price(PriceArgs),

    /// Resolve a cart fixture
    Cart(CartArgs),

    /// List the catalog
    Catalog(CatalogArgs),

    /// Compare products
    Compare(CompareArgs),
}

/// Storefront configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront price and discount resolver", long_about = None)]
pub(crate) struct Settings {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Fixture and resolver settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Settings {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_pricing_flags_and_subcommand() -> TestResult {
        let settings = Settings::try_parse_from([
            "storefront",
            "--date",
            "2024-06-01",
            "--floor",
            "1",
            "--strict",
            "price",
            "phone",
            "--price",
            "10.00 GBP",
        ])?;

        assert_eq!(settings.pricing.date(), date(2024, 6, 1));
        assert_eq!(
            settings.pricing.resolver(),
            ResolverConfig {
                floor_minor: Some(1),
                cart_policy: CartDiscountPolicy::Strict,
            }
        );
        assert!(matches!(
            settings.command,
            Command::Price(PriceArgs { ref product, .. }) if product == "phone"
        ));

        Ok(())
    }

    #[test]
    fn compare_needs_two_products() {
        let result = Settings::try_parse_from(["storefront", "compare", "phone"]);

        assert!(result.is_err());
    }
}
