use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use resa_places::{
    constants::DEFAULT_DEBOUNCE, default_http_client, AddressAutocomplete, Document,
    GeocodingProvider, GooglePlaces, PointerDown, SuggestOptions,
};
use resa_server::config::ServerConfig;
use taxi_resa::{submit::submit, BookingForm, BookingRequest, Contact};
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    time,
};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Time left to the field after a debounce window, for its lookup to start.
const SETTLE: Duration = Duration::from_millis(50);
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(about = "Taxi booking toolbox")]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(short = 'k', long, env = "GOOGLE_MAPS_API_KEY", global = true)]
    pub api_key: Option<String>,

    #[arg(short = 'p', long, help = "Places autocomplete endpoint", global = true)]
    pub places_endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(about = "Print address suggestions for a query")]
    Suggest { query: String },

    #[clap(about = "Drive an address field from stdin, one action per line")]
    Pick {
        #[arg(short = 'f', long, value_enum, default_value_t = Field::Origin)]
        field: Field,
    },

    #[clap(about = "Send a booking to the relay")]
    Book {
        #[command(flatten)]
        booking_opts: BookingOpts,

        #[arg(
            short = 'r',
            long,
            env = "RESA_RELAY_URL",
            default_value = "http://localhost:3000/api/reservation"
        )]
        relay_url: String,
    },

    #[clap(about = "Run the booking relay")]
    Serve {
        #[arg(long, help = "Overrides RESA_PORT")]
        port: Option<u16>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Field {
    Origin,
    Destination,
}

#[derive(Args, Debug)]
struct BookingOpts {
    #[arg(long, help = "JSON booking file", conflicts_with_all = ["from", "to", "date"])]
    pub payload: Option<PathBuf>,

    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long, help = "Pickup time, YYYY-MM-DDTHH:MM")]
    pub date: Option<String>,
    #[arg(long)]
    pub round_trip: bool,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl BookingOpts {
    async fn into_request(self) -> Result<BookingRequest> {
        if let Some(path) = self.payload {
            return BookingRequest::load(&path)
                .await
                .with_context(|| format!("unable to load {}", path.display()));
        }
        Ok(BookingRequest {
            origin: self.from.unwrap_or_default(),
            destination: self.to.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            is_round_trip: self.round_trip,
            contact: Contact {
                name: self.name.unwrap_or_default(),
                phone: self.phone.unwrap_or_default(),
                email: self.email,
            },
            notes: self.notes,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let http = default_http_client();
    let places = args.global_opts.api_key.as_deref().map(|key| {
        Arc::new(GooglePlaces::custom(
            http.clone(),
            key,
            args.global_opts.places_endpoint.as_deref(),
        ))
    });

    match args.subcommand {
        Command::Suggest { query } => {
            let Some(places) = places else {
                bail!("a Google Maps API key is required (--api-key or GOOGLE_MAPS_API_KEY)");
            };
            let suggestions = places.suggest(&query, &SuggestOptions::default()).await?;
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Command::Pick { field } => {
            if places.is_none() {
                warn!("no API key given, the field will not show suggestions");
            }
            let document = Document::new();
            let form = BookingForm::mount(places, &document, "")?;
            let driven = match field {
                Field::Origin => &form.origin,
                Field::Destination => &form.destination,
            };
            info!("driving the {} field", driven.label());

            let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
            while let Some(line) = lines.next().await {
                apply(driven, &document, line?.trim_end());
                settle(driven).await;
                println!("{}", serde_json::to_string(&driven.state())?);
            }
            println!("{}", driven.value());
            form.unmount().await;
        }
        Command::Book {
            booking_opts,
            relay_url,
        } => {
            let booking = booking_opts.into_request().await?;
            booking.validate()?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
            spinner.set_message(format!(
                "Envoi de la réservation ({}) {} → {}",
                booking.trip_label(),
                booking.origin,
                booking.destination
            ));
            spinner.enable_steady_tick(Duration::from_millis(100));
            let answer = submit(&http, &relay_url, &booking).await;
            spinner.finish_and_clear();

            println!("{}", serde_json::to_string_pretty(&answer?)?);
        }
        Command::Serve { port } => {
            let mut config = ServerConfig::load();
            if let Some(port) = port {
                config.port = port;
            }
            resa_server::start_server(config).await?;
        }
    }

    Ok(())
}

/// One stdin line: `:N` picks the Nth suggestion, `:clear`, `:focus` and `:blur` act on the
/// field, anything else replaces the typed value.
fn apply(field: &AddressAutocomplete, document: &Document, line: &str) {
    match line {
        ":clear" => field.clear(),
        ":focus" => {
            document.pointer_down(PointerDown::on(field.element()));
            field.focus();
        }
        ":blur" => document.pointer_down(PointerDown::elsewhere()),
        _ => match line.strip_prefix(':').map(str::parse::<usize>) {
            Some(Ok(position)) => {
                let state = field.state();
                match position.checked_sub(1).and_then(|i| state.suggestions.get(i)) {
                    Some(suggestion) => field.select(suggestion.id.clone()),
                    None => warn!("no suggestion at position {position}"),
                }
            }
            _ => field.input(line),
        },
    }
}

/// Wait out the debounce window, then for any lookup it started.
async fn settle(field: &AddressAutocomplete) {
    time::sleep(DEFAULT_DEBOUNCE + SETTLE).await;
    let mut state = field.subscribe();
    let settled = time::timeout(LOOKUP_TIMEOUT, state.wait_for(|s| !s.is_loading))
        .await
        .is_ok();
    if !settled {
        warn!("lookup still running after {LOOKUP_TIMEOUT:?}");
    }
}
