//! Storefront command line

use std::{
    io::{self, Write},
    process::ExitCode,
};

use storefront::{
    catalog::listing::{self, ListingError, ListingFilter, ListingQuery, ListingSort, Pagination},
    compare::{CompareError, CompareList},
    fixtures::{Fixture, FixtureError, parse_money},
    pricing::{PriceResolver, PricingError},
    receipt::{Receipt, ReceiptError},
    reviews::ReviewBook,
};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::{CartArgs, CatalogArgs, Command, CompareArgs, PriceArgs, Settings},
    observability::{ObservabilityError, init_subscriber},
};

mod config;
mod observability;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            // Help and version requests are reported through the same path.
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            report(&err);

            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "final error report for the user")]
fn report(err: &CliError) {
    eprintln!("error: {err}");
}

fn run(settings: &Settings) -> Result<(), CliError> {
    init_subscriber(&settings.logging)?;

    let mut fixture = Fixture::with_base_path(&settings.pricing.fixtures);

    fixture
        .load_catalog(&settings.pricing.set)?
        .load_discounts(&settings.pricing.set)?;

    let date = settings.pricing.date();

    info!(set = %settings.pricing.set, %date, "loaded fixture set");

    let resolver = PriceResolver::new(fixture.catalog()?, fixture.discounts()?, date)
        .with_config(settings.pricing.resolver());

    match &settings.command {
        Command::Price(args) => price(&fixture, &resolver, args),
        Command::Cart(args) => cart(&fixture, &resolver, args),
        Command::Catalog(args) => catalog(&fixture, &resolver, args),
        Command::Compare(args) => compare(&fixture, args),
    }
}

fn price(
    fixture: &Fixture<'_>,
    resolver: &PriceResolver<'_, '_>,
    args: &PriceArgs,
) -> Result<(), CliError> {
    let product = fixture.product_key(&args.product)?;

    let old_price = match (&args.price, &args.seller) {
        (Some(price), _) => Some(parse_money(price)?),
        (None, Some(seller)) => {
            let seller_key = fixture.seller_key(seller)?;

            let offer = fixture
                .catalog()?
                .offers_for(product)
                .find(|offer| offer.seller == seller_key)
                .ok_or_else(|| FixtureError::OfferNotFound(args.product.clone(), seller.clone()))?;

            Some(offer.price)
        }
        (None, None) => None,
    };

    let resolution = resolver.resolve_item(product, old_price)?;

    let discount = resolution
        .applied
        .and_then(|applied| resolver.discounts().item(applied.key))
        .map_or("none", |discount| discount.name());

    info!(product = %args.product, price = %resolution.price, "resolved item price");

    let mut out = io::stdout().lock();

    writeln!(out, "Price:    {}", resolution.original)?;
    writeln!(out, "Final:    {}", resolution.price)?;
    writeln!(out, "Discount: {discount}")?;

    Ok(())
}

fn cart(
    fixture: &Fixture<'_>,
    resolver: &PriceResolver<'_, '_>,
    args: &CartArgs,
) -> Result<(), CliError> {
    let cart = fixture.load_cart(&args.name)?;
    let resolution = resolver.resolve_cart(&cart)?;

    info!(
        cart = %args.name,
        items = resolution.len(),
        total = %resolution.total(),
        "resolved cart"
    );

    Receipt::new(&resolution).write_to(
        io::stdout().lock(),
        fixture.catalog()?,
        fixture.discounts()?,
    )?;

    Ok(())
}

fn catalog(
    fixture: &Fixture<'_>,
    resolver: &PriceResolver<'_, '_>,
    args: &CatalogArgs,
) -> Result<(), CliError> {
    let filter = ListingFilter {
        name: args.name.clone(),
        seller: args.seller.clone(),
        price_min: args.price_min.as_deref().map(parse_money).transpose()?,
        price_max: args.price_max.as_deref().map(parse_money).transpose()?,
        in_stock: args.in_stock,
        free_delivery: args.free_delivery,
        category: args
            .category
            .as_deref()
            .map(|key| fixture.category_key(key))
            .transpose()?,
    };

    let query = ListingQuery {
        filter,
        sort: ListingSort::parse(&args.sort, &args.trend)?,
        pagination: Pagination {
            page: args.page,
            per_page: args.per_page,
        },
    };

    let reviews = ReviewBook::new();
    let page = listing::list(resolver, &reviews, &query)?;

    info!(total = page.total, page = page.page, "listed catalog");

    let mut out = io::stdout().lock();

    for listed in &page.items {
        writeln!(
            out,
            "{:<32} {:>12}  sellers: {:<3} stock: {}",
            listed.product.name, listed.price, listed.sellers, listed.stock
        )?;
    }

    writeln!(
        out,
        "\nPage {} ({} products{})",
        page.page,
        page.total,
        if page.has_more { ", more available" } else { "" }
    )?;

    Ok(())
}

fn compare(fixture: &Fixture<'_>, args: &CompareArgs) -> Result<(), CliError> {
    let list = args
        .products
        .iter()
        .try_fold(CompareList::new(), |list, key| {
            Ok::<_, FixtureError>(list.with_product(fixture.product_key(key)?))
        })?;

    let comparison = list.compare(fixture.catalog()?)?;

    let mut out = io::stdout().lock();

    write!(out, "{:<20}", "")?;

    for (_, product) in &comparison.products {
        write!(out, " {:<20}", product.name)?;
    }

    writeln!(out)?;

    for row in &comparison.rows {
        let marker = if row.differs { "*" } else { " " };

        write!(out, "{marker}{:<19}", row.name)?;

        for value in &row.values {
            write!(out, " {:<20}", value.unwrap_or("-"))?;
        }

        writeln!(out)?;
    }

    Ok(())
}
