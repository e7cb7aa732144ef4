//! `peerdesk` command-line entry point.
//!
//! Offline commands read JSON files and print JSON to stdout; `fetch`,
//! `bookings`, `select`, `checkout`, and `order-status` talk to the configured
//! state API and BAP service.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use peerdesk::config::PeerdeskSettings;
use peerdesk::domain::ports::{BecknGateway, BookingRepository};
use peerdesk::domain::{
    BookingInput, BookingReference, BookingType, CheckoutRequest, CheckoutService,
    DashboardSession, MigratedState, MigrationReport, PassengerForm, PaymentDetails,
    PaymentSimulator, PeerNetwork, SearchContext, TRENDING_LIMIT, UserId, bucket_by_type,
    extract_booking, merge_booking_lists, migrate_state, select_request, skill_gap_for,
    status_request, trending_skills,
};
use peerdesk::outbound::http::{BapClient, StateApiClient};
use peerdesk::telemetry;
use serde_json::{Value, json};
use tokio::runtime::Builder;
use tracing::info;

/// `peerdesk` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "peerdesk",
    about = "Skill gap analysis for a peer network, plus travel booking tools",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the skill gap report and trending skills for a saved state.
    Gap {
        /// Saved state JSON in any historical shape.
        #[arg(long, value_name = "path")]
        state: PathBuf,
        /// Number of trending skills to list.
        #[arg(long, default_value_t = TRENDING_LIMIT)]
        trending: usize,
    },
    /// Print the canonical form of a saved state.
    Migrate {
        /// Saved state JSON in any historical shape.
        #[arg(long, value_name = "path")]
        state: PathBuf,
    },
    /// Print the flat booking record for a selected item.
    ExtractBooking {
        /// Item JSON as returned by the provider search.
        #[arg(long, value_name = "path")]
        item: PathBuf,
        /// flight, hotel, bus, train, or experience.
        #[arg(long = "type", value_name = "type")]
        booking_type: BookingType,
        /// Traveller form JSON.
        #[arg(long, value_name = "path")]
        passenger: Option<PathBuf>,
        /// Payment transaction id to record.
        #[arg(long = "transaction-id", value_name = "id")]
        transaction_id: Option<String>,
    },
    /// Load a user's saved state from the state API and print its skill gap.
    Fetch {
        /// Account id.
        #[arg(long, value_name = "id", value_parser = UserId::parse)]
        user: UserId,
    },
    /// List bookings from the BAP service, grouped by travel mode.
    Bookings {
        /// Traveller e-mail.
        #[arg(long, value_name = "email")]
        email: Option<String>,
        /// Account id.
        #[arg(long, value_name = "id", value_parser = UserId::parse)]
        user: Option<UserId>,
    },
    /// Send a Beckn select for one unit of an item.
    Select {
        /// Item JSON as returned by the provider search.
        #[arg(long, value_name = "path")]
        item: PathBuf,
        /// flight, hotel, bus, train, or experience.
        #[arg(long = "type", value_name = "type")]
        booking_type: BookingType,
    },
    /// Pay, confirm with the Beckn network, and save the booking.
    Checkout(CheckoutArgs),
    /// Ask the Beckn network for the state of a confirmed order.
    OrderStatus {
        /// Travel mode of the order.
        #[arg(long = "type", value_name = "type")]
        booking_type: BookingType,
        /// Order id returned by the confirm.
        #[arg(long = "order", value_name = "id")]
        order_id: String,
    },
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Item JSON as returned by the provider search.
    #[arg(long, value_name = "path")]
    item: PathBuf,
    /// flight, hotel, bus, train, or experience.
    #[arg(long = "type", value_name = "type")]
    booking_type: BookingType,
    /// Payment details JSON tagged by `method` (card, upi, razorpay, paypal).
    #[arg(long, value_name = "path")]
    payment: PathBuf,
    /// Traveller form JSON.
    #[arg(long, value_name = "path")]
    passenger: Option<PathBuf>,
    /// Search context JSON.
    #[arg(long = "search", value_name = "path")]
    search_context: Option<PathBuf>,
    /// Signed-in account e-mail.
    #[arg(long, value_name = "email")]
    email: Option<String>,
    /// Signed-in account id.
    #[arg(long, value_name = "id", value_parser = UserId::parse)]
    user: Option<UserId>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = PeerdeskSettings::load_from_iter([OsString::from("peerdesk")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    telemetry::init(settings.log_format()?);

    let output = match args.command {
        Command::Gap { state, trending } => gap(&state, trending)?,
        Command::Migrate { state } => {
            let migrated = read_state(&state)?;
            serde_json::to_value(&migrated.state)?
        }
        Command::ExtractBooking {
            item,
            booking_type,
            passenger,
            transaction_id,
        } => extract(&item, booking_type, passenger.as_deref(), transaction_id)?,
        Command::Fetch { user } => block_on(fetch(&settings, user))?,
        Command::Bookings { email, user } => block_on(bookings(&settings, email, user))?,
        Command::Select { item, booking_type } => {
            let item = read_json(&item)?;
            block_on(select(&settings, booking_type, item))?
        }
        Command::Checkout(args) => {
            let request = checkout_request(args)?;
            block_on(checkout(&settings, request))?
        }
        Command::OrderStatus {
            booking_type,
            order_id,
        } => block_on(order_status(&settings, booking_type, order_id))?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn block_on<F: std::future::Future<Output = Result<Value>>>(future: F) -> Result<Value> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(future)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_state(path: &Path) -> Result<MigratedState> {
    let migrated = migrate_state(read_json(path)?)
        .with_context(|| format!("failed to migrate state in {}", path.display()))?;
    log_migration(&migrated.report);
    Ok(migrated)
}

fn log_migration(report: &MigrationReport) {
    if !report.is_clean() {
        info!(
            legacy_skills = report.legacy_skills,
            folded_company = report.folded_company,
            retargeted_resources = report.retargeted_resources,
            discarded_records = report.discarded_records,
            "state migrated from a legacy shape"
        );
    }
}

fn read_as<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("{} is not {what}", path.display()))
}

fn gap(path: &Path, trending: usize) -> Result<Value> {
    let migrated = read_state(path)?;
    Ok(json!({
        "skillGap": skill_gap_for(&migrated.state),
        "trending": trending_skills(&migrated.state, trending),
    }))
}

fn extract(
    item_path: &Path,
    booking_type: BookingType,
    passenger_path: Option<&Path>,
    transaction_id: Option<String>,
) -> Result<Value> {
    let mut input = BookingInput::new(booking_type, read_json(item_path)?);
    if let Some(path) = passenger_path {
        input.passenger = read_as::<PassengerForm>(path, "a passenger form")?;
    }
    input.transaction_id = transaction_id;

    let now = Utc::now();
    let record = extract_booking(&input, BookingReference::generate(now), now);
    Ok(serde_json::to_value(record)?)
}

async fn fetch(settings: &PeerdeskSettings, user: UserId) -> Result<Value> {
    let client = Arc::new(StateApiClient::new(
        settings.state_api_url()?,
        settings.request_timeout(),
    )?);
    let network = PeerNetwork {
        directory: client.clone(),
        skill_match: client.clone(),
        delivery: client.clone(),
    };
    let mut session = DashboardSession::new(user, client, network, Arc::new(DefaultClock));
    let report = session.load().await?;
    log_migration(&report);

    Ok(json!({
        "user": user,
        "skillGap": session.skill_gap(),
        "trending": session.trending(TRENDING_LIMIT),
    }))
}

async fn bookings(
    settings: &PeerdeskSettings,
    email: Option<String>,
    user: Option<UserId>,
) -> Result<Value> {
    if email.is_none() && user.is_none() {
        return Err(eyre!("pass --email, --user, or both"));
    }
    let client = BapClient::new(settings.bap_url()?, settings.request_timeout())?;

    let mut lists = Vec::with_capacity(2);
    if let Some(email) = email.as_deref() {
        lists.push(client.list_by_email(email).await?);
    }
    if let Some(user) = user {
        lists.push(client.list_by_user(user).await?);
    }
    let buckets = bucket_by_type(merge_booking_lists(lists));

    let counts = buckets
        .counts()
        .map(|(kind, count)| (kind.to_string(), json!(count)))
        .collect::<serde_json::Map<_, _>>();
    Ok(json!({
        "total": buckets.total(),
        "counts": counts,
        "bookings": buckets.all(),
    }))
}

fn checkout_request(args: CheckoutArgs) -> Result<CheckoutRequest> {
    let passenger = match args.passenger.as_deref() {
        Some(path) => read_as::<PassengerForm>(path, "a passenger form")?,
        None => PassengerForm::default(),
    };
    let search_context = args
        .search_context
        .as_deref()
        .map(|path| read_as::<SearchContext>(path, "a search context"))
        .transpose()?;
    Ok(CheckoutRequest {
        booking_type: args.booking_type,
        item: read_json(&args.item)?,
        passenger,
        search_context,
        user_id: args.user.map(|user| json!(user)),
        user_email: args.email,
        amount: None,
        payment: read_as::<PaymentDetails>(&args.payment, "payment details")?,
    })
}

async fn select(
    settings: &PeerdeskSettings,
    booking_type: BookingType,
    item: Value,
) -> Result<Value> {
    let client = BapClient::new(settings.bap_url()?, settings.request_timeout())?;
    let envelope = select_request(&settings.bap_identity()?, booking_type, &item, Utc::now());
    Ok(client.select(&envelope).await?)
}

async fn checkout(settings: &PeerdeskSettings, request: CheckoutRequest) -> Result<Value> {
    let client = Arc::new(BapClient::new(
        settings.bap_url()?,
        settings.request_timeout(),
    )?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let service = CheckoutService::new(
        client.clone(),
        client,
        PaymentSimulator::new(settings.payment_delay(), clock.clone()),
        settings.bap_identity()?,
        clock,
    );
    info!(booking_type = %request.booking_type, "starting checkout");
    let outcome = service.checkout(&request).await?;
    Ok(serde_json::to_value(outcome)?)
}

async fn order_status(
    settings: &PeerdeskSettings,
    booking_type: BookingType,
    order_id: String,
) -> Result<Value> {
    let client = BapClient::new(settings.bap_url()?, settings.request_timeout())?;
    let envelope = status_request(&settings.bap_identity()?, booking_type, order_id, Utc::now());
    Ok(client.status(&envelope).await?)
}

#[cfg(test)]
mod tests {
    //! Unit tests for argument parsing and request assembly.

    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    fn json_file(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{value}").expect("write fixture");
        file
    }

    fn checkout_args(argv: &[&str]) -> CheckoutArgs {
        let args = CliArgs::try_parse_from(argv).expect("arguments parse");
        let Command::Checkout(checkout) = args.command else {
            panic!("expected the checkout command");
        };
        checkout
    }

    #[rstest]
    fn checkout_arguments_parse() {
        let args = checkout_args(&[
            "peerdesk", "checkout", "--item", "item.json", "--type", "train", "--payment",
            "upi.json", "--user", "7",
        ]);
        assert_eq!(args.booking_type, BookingType::Train);
        assert_eq!(args.user, Some(UserId::new(7)));
        assert!(args.passenger.is_none());
    }

    #[rstest]
    fn order_status_requires_an_order_id() {
        let parsed = CliArgs::try_parse_from(["peerdesk", "order-status", "--type", "bus"]);
        assert!(parsed.is_err(), "--order is mandatory");
    }

    #[rstest]
    fn checkout_request_reads_every_file() {
        let item = json_file(&json!({ "id": "12627", "price": "1,850" }));
        let payment = json_file(&json!({ "method": "upi", "upiId": "ravi@upi" }));
        let search = json_file(&json!({ "origin": "BLR", "travelDate": "2026-07-01" }));
        let args = CheckoutArgs {
            item: item.path().to_path_buf(),
            booking_type: BookingType::Train,
            payment: payment.path().to_path_buf(),
            passenger: None,
            search_context: Some(search.path().to_path_buf()),
            email: Some("ravi@example.com".to_owned()),
            user: Some(UserId::new(7)),
        };

        let request = checkout_request(args).expect("request assembles");

        assert_eq!(request.item["id"], "12627");
        assert_eq!(
            request.payment,
            PaymentDetails::Upi {
                upi_id: "ravi@upi".to_owned()
            }
        );
        let context = request.search_context.expect("search context");
        assert_eq!(context.origin.as_deref(), Some("BLR"));
        assert_eq!(context.travel_date.as_deref(), Some("2026-07-01"));
        assert_eq!(request.user_id, Some(json!(7)));
        assert_eq!(request.user_email.as_deref(), Some("ravi@example.com"));
    }

    #[rstest]
    fn unknown_payment_methods_are_reported_with_the_file() {
        let item = json_file(&json!({ "id": "bus-1" }));
        let payment = json_file(&json!({ "method": "cash" }));
        let args = CheckoutArgs {
            item: item.path().to_path_buf(),
            booking_type: BookingType::Bus,
            payment: payment.path().to_path_buf(),
            passenger: None,
            search_context: None,
            email: None,
            user: None,
        };

        let error = checkout_request(args).expect_err("cash is not a payment method");

        assert!(error.to_string().ends_with("is not payment details"));
    }
}
