mod args;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use atb_booking::{BookingManager, FlightCatalog, SeatAvailability};
use atb_core::models::{Booking, Flight};
use atb_core::repository::{BookingRepository, FlightRepository};
use atb_core::FlightSearchCriteria;
use atb_store::app_config::{Config, StorageConfig};
use atb_store::{CsvBookingRepository, CsvFileStore, CsvFlightRepository, CsvPassengerRepository};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(2);
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.logging.filter.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

struct Services {
    manager: BookingManager,
    catalog: FlightCatalog,
}

async fn open(storage: &StorageConfig) -> anyhow::Result<Services> {
    if storage.create_missing {
        for path in [&storage.flights_path, &storage.bookings_path, &storage.passengers_path] {
            ensure_file(path).await?;
        }
    }

    let store = Arc::new(CsvFileStore::new());
    let flights: Arc<dyn FlightRepository> = Arc::new(
        CsvFlightRepository::open(store.clone(), &storage.flights_path)
            .await
            .context("Failed to open flights")?,
    );
    let passengers = Arc::new(
        CsvPassengerRepository::open(store.clone(), &storage.passengers_path)
            .await
            .context("Failed to open passengers")?,
    );
    let bookings: Arc<dyn BookingRepository> = Arc::new(
        CsvBookingRepository::open(store.clone(), &storage.bookings_path, flights.clone())
            .await
            .context("Failed to open bookings")?,
    );

    Ok(Services {
        manager: BookingManager::new(bookings.clone(), flights.clone(), passengers),
        catalog: FlightCatalog::new(flights, SeatAvailability::new(bookings), store),
    })
}

/// Creates an empty data file, and its directory, when absent
async fn ensure_file(path: &Path) -> anyhow::Result<()> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, b"").await?;
    info!("Created empty data file {}", path.display());
    Ok(())
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let Services { manager, catalog } = open(&config.storage).await?;

    match cli.command {
        Command::Flights(filter) => {
            let criteria = FlightSearchCriteria::from(filter);
            let flights = catalog.get_available_flights_matching_criteria(&criteria).await;
            for flight in &flights {
                println!("{}", render_flight(flight));
            }
            println!("{} flights", flights.len());
        }
        Command::Book { flight, passenger, class } => {
            let booking = manager.book_flight(flight, passenger, class).await?;
            println!("Booked {}", render_booking(&booking));
        }
        Command::Cancel { booking } => {
            let booking = manager.cancel_booking(booking).await?;
            println!("Cancelled {}", render_booking(&booking));
        }
        Command::Modify { booking, class } => {
            let booking = manager.modify_booking(booking, class).await?;
            println!("Modified {}", render_booking(&booking));
        }
        Command::Bookings { passenger } => {
            for booking in manager.get_passenger_bookings(passenger).await {
                println!("{}", render_booking(&booking));
            }
        }
        Command::FilterBookings { passenger, flight, route } => {
            let criteria = route.into_booking_criteria(passenger, flight);
            for booking in manager.get_matching_criteria(Some(&criteria)).await {
                println!("{}", render_booking(&booking));
            }
        }
        Command::Import { file } => {
            let violations = catalog.import_flights(&file).await?;
            if violations.is_empty() {
                println!("All flights imported");
            } else {
                for violation in &violations {
                    println!("{}", violation);
                }
                println!("{} violations, valid flights were imported", violations.len());
            }
        }
        Command::Rules => {
            for (field, rules) in catalog.validation_rules() {
                println!("{:<20} {}", field, rules);
            }
        }
    }

    Ok(())
}

fn render_flight(flight: &Flight) -> String {
    let classes = flight
        .class_details
        .iter()
        .map(|d| format!("{} {} ({} seats)", d.class, d.price, d.capacity))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} {} ({}) -> {} ({}) at {}: {}",
        flight.id,
        flight.departure_country,
        flight.departure_airport,
        flight.destination_country,
        flight.arrival_airport,
        flight.departure_date.to_rfc3339(),
        classes
    )
}

fn render_booking(booking: &Booking) -> String {
    format!(
        "booking {} for passenger {} on flight {}, {} (booked {})",
        booking.id,
        booking.passenger_id,
        booking.flight_id,
        booking.class,
        booking.booking_date.to_rfc3339()
    )
}
