//! Roombook command-line client
//!
//! ```text
//! roombook login <user> <password>
//! roombook reserve A3 tomorrow 09:00 10:00
//! roombook bookings --filter reserved --search amphi
//! ```

use chrono::{Duration, NaiveDate};
use roombook::bookings::{
    BookingListAction, BookingListEnvironment, BookingListReducer, BookingListState, StatusFilter,
};
use roombook::dashboard::DashboardSummary;
use roombook::notification::Notification;
use roombook::storage::{DraftMailbox, FileStore, KeyValueStore};
use roombook::types::{BookingId, Language, Room, RoomCatalog, SignupRequest, TimeSlot, local_date};
use roombook::wizard::{WizardAction, WizardEnvironment, WizardReducer, WizardState, WizardStep};
use roombook::{BookingApi, BookingError, Config, HttpBookingApi, Session, SessionManager};
use roombook_core::environment::{Clock, SystemClock};
use roombook_runtime::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const USAGE: &str = "\
Usage: roombook <command> [args]

Commands:
  login <user> <password>            Log in and remember the session
  logout                             Forget the session
  signup <user> <email> <password>   Create an account
  language <en|fr>                   Set the e-mail language
  rooms                              List rooms
  reserve <room> <date> <HH:MM>...   Book one or more hours (date: YYYY-MM-DD, today, tomorrow)
  bookings [--filter all|reserved|cancelled] [--search <text>]
  cancel <booking-id>                Cancel one of your bookings
  preview <booking-id>               Show the confirmation e-mail for a booking
  dashboard                          Upcoming bookings and room counts";

struct App {
    config: Config,
    api: Arc<HttpBookingApi>,
    sessions: SessionManager,
    mailbox: DraftMailbox,
    clock: Arc<dyn Clock>,
}

#[tokio::main]
async fn main() -> CliResult {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roombook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(
        api = %config.api.base_url,
        state_file = %config.storage.state_file.display(),
        "Configuration loaded"
    );

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage.state_file));
    let app = App {
        api: Arc::new(HttpBookingApi::from_config(&config)?),
        sessions: SessionManager::new(Arc::clone(&store)),
        mailbox: DraftMailbox::new(store),
        clock: Arc::new(SystemClock),
        config,
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    match command.as_str() {
        "login" => login(&app, rest).await,
        "logout" => {
            app.sessions.logout()?;
            println!("Logged out");
            Ok(())
        },
        "signup" => signup(&app, rest).await,
        "language" => language(&app, rest),
        "rooms" => rooms(&app).await,
        "reserve" => reserve(&app, rest).await,
        "bookings" => bookings(&app, rest).await,
        "cancel" => cancel(&app, rest).await,
        "preview" => preview(&app, rest).await,
        "dashboard" => dashboard(&app).await,
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        },
        other => Err(usage(&format!("unknown command `{other}`"))),
    }
}

fn usage(message: &str) -> Box<dyn std::error::Error> {
    Box::new(BookingError::Validation(format!("{message}\n\n{USAGE}")))
}

fn require_session(app: &App) -> CliResult<Session> {
    app.sessions.restore()?.ok_or_else(|| {
        BookingError::Unauthorized {
            message: Some("Not logged in; run `roombook login <user> <password>`".to_string()),
        }
        .into()
    })
}

async fn login(app: &App, args: &[String]) -> CliResult {
    let [user, password] = args else {
        return Err(usage("login takes <user> <password>"));
    };
    let session = app.sessions.login(app.api.as_ref(), user, password).await?;
    println!("Logged in as {} (id {})", session.identity.user_name, session.identity.id);
    Ok(())
}

async fn signup(app: &App, args: &[String]) -> CliResult {
    let [user_name, email, password] = args else {
        return Err(usage("signup takes <user> <email> <password>"));
    };
    let ack = app
        .sessions
        .signup(
            app.api.as_ref(),
            SignupRequest {
                user_name: user_name.clone(),
                email: email.clone(),
                password: password.clone(),
            },
        )
        .await?;
    println!("{}", ack.message.as_deref().unwrap_or("Account created"));
    Ok(())
}

fn language(app: &App, args: &[String]) -> CliResult {
    let [code] = args else {
        return Err(usage("language takes <en|fr>"));
    };
    let language: Language = code.parse()?;
    let mut session = require_session(app)?;
    app.sessions.set_language(&mut session, language)?;
    println!("Language set to {}", language.code());
    Ok(())
}

async fn rooms(app: &App) -> CliResult {
    let catalog = RoomCatalog::new(app.api.fetch_rooms().await?);
    if catalog.is_empty() {
        println!("No rooms found");
        return Ok(());
    }
    for room in catalog.rooms() {
        println!("{:>4}  {}", room.id(), room.display_name());
    }
    let counts = catalog.counts();
    println!(
        "\n{} rooms ({} regular, {} amphitheaters)",
        counts.total, counts.regular, counts.amphitheater
    );
    Ok(())
}

fn parse_date(text: &str, today: NaiveDate) -> CliResult<NaiveDate> {
    match text {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| usage(&format!("bad date `{text}`: {e}"))),
    }
}

fn parse_booking_id(args: &[String]) -> CliResult<BookingId> {
    let [id] = args else {
        return Err(usage("expected one <booking-id>"));
    };
    id.parse::<i64>()
        .map(BookingId::new)
        .map_err(|_| usage(&format!("bad booking id `{id}`")))
}

async fn reserve(app: &App, args: &[String]) -> CliResult {
    let [room_name, date, hours @ ..] = args else {
        return Err(usage("reserve takes <room> <date> <HH:MM>..."));
    };
    let session = require_session(app)?;

    let env = WizardEnvironment::new(
        Arc::clone(&app.api) as Arc<dyn BookingApi>,
        Arc::clone(&app.clock),
        app.config.utc_offset(),
    );
    let date = parse_date(date, env.today())?;
    let slots = hours
        .iter()
        .map(|hour| hour.parse::<TimeSlot>())
        .collect::<Result<Vec<_>, _>>()?;

    let store = Store::new(WizardState::new(), WizardReducer::new(), env);
    store.send(WizardAction::LoadRooms).await?.wait().await;

    let room = store
        .state(|s| {
            s.catalog
                .rooms()
                .iter()
                .find(|room| room.display_name().eq_ignore_ascii_case(room_name))
                .cloned()
        })
        .await;
    let mut actions = match room {
        Some(Room::Regular { letter, number, .. }) => vec![
            WizardAction::ChooseLetter(letter),
            WizardAction::ChooseNumber(number),
        ],
        Some(Room::Amphitheater { name, .. }) => vec![
            WizardAction::ChooseRoomKind(roombook::types::RoomKind::Amphitheater),
            WizardAction::ChooseAmphitheater(name),
        ],
        None => Vec::new(),
    };
    actions.push(WizardAction::Next);
    actions.push(WizardAction::SelectDate(date));
    actions.push(WizardAction::Next);
    actions.extend(slots.into_iter().map(WizardAction::ToggleSlot));
    actions.push(WizardAction::Submit {
        credentials: session.credentials(),
    });

    for action in actions {
        store.send(action).await?.wait().await;
    }

    let (step, errors) = store.state(|s| (s.step.clone(), s.errors.clone())).await;
    match step {
        WizardStep::Confirmed { receipt } => {
            println!(
                "{}",
                receipt.message.as_deref().unwrap_or("Reservation has been reserved")
            );
            let email = Notification::from_receipt(&receipt, &session.identity, session.language).render();
            println!("\n{}\n\n{}", email.subject, email.body);
            Ok(())
        },
        _ => {
            let message = errors.into_values().collect::<Vec<_>>().join("\n");
            Err(Box::new(BookingError::Validation(if message.is_empty() {
                "Reservation was not submitted".to_string()
            } else {
                message
            })))
        },
    }
}

fn booking_list_store(
    app: &App,
    language: Language,
) -> Store<BookingListState, BookingListAction, BookingListEnvironment, BookingListReducer> {
    let env = BookingListEnvironment::new(
        Arc::clone(&app.api) as Arc<dyn BookingApi>,
        app.mailbox.clone(),
        app.config.utc_offset(),
    );
    Store::new(BookingListState::new(language), BookingListReducer::new(), env)
}

async fn load_bookings(
    app: &App,
    session: &Session,
) -> CliResult<Store<BookingListState, BookingListAction, BookingListEnvironment, BookingListReducer>> {
    let store = booking_list_store(app, session.language);
    store
        .send(BookingListAction::Load {
            credentials: session.credentials(),
        })
        .await?
        .wait()
        .await;
    if let Some(error) = store.state(|s| s.error.clone()).await {
        return Err(Box::new(BookingError::Validation(error)));
    }
    Ok(store)
}

async fn bookings(app: &App, args: &[String]) -> CliResult {
    let session = require_session(app)?;
    let store = load_bookings(app, &session).await?;

    let mut rest = args.iter();
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .ok_or_else(|| usage(&format!("{flag} needs a value")))?;
        match flag.as_str() {
            "--filter" => {
                store
                    .send(BookingListAction::SetFilter(value.parse::<StatusFilter>()?))
                    .await?;
            },
            "--search" => {
                store.send(BookingListAction::Search(value.clone())).await?;
            },
            other => return Err(usage(&format!("unknown option `{other}`"))),
        }
    }

    let offset = app.config.utc_offset();
    let lines = store
        .state(|s| {
            s.visible()
                .iter()
                .map(|b| {
                    let start = b.start_time.with_timezone(&offset);
                    let end = b.end_time.with_timezone(&offset);
                    format!(
                        "{:>5}  {}  {}-{}  {:<12} {}",
                        b.id,
                        start.format("%Y-%m-%d"),
                        start.format("%H:%M"),
                        end.format("%H:%M"),
                        b.room_name(),
                        if b.reserved { "reserved" } else { "cancelled" }
                    )
                })
                .collect::<Vec<_>>()
        })
        .await;

    if lines.is_empty() {
        println!("No bookings found");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn cancel(app: &App, args: &[String]) -> CliResult {
    let id = parse_booking_id(args)?;
    let session = require_session(app)?;
    let store = load_bookings(app, &session).await?;

    store.send(BookingListAction::RequestCancel(id)).await?;
    store
        .send(BookingListAction::ConfirmCancel {
            credentials: session.credentials(),
        })
        .await?
        .wait()
        .await;

    let (notice, error) = store.state(|s| (s.notice.clone(), s.error.clone())).await;
    if let Some(error) = error {
        return Err(Box::new(BookingError::Validation(error)));
    }
    println!("{}", notice.unwrap_or_else(|| format!("Booking {id} cancelled")));
    Ok(())
}

async fn preview(app: &App, args: &[String]) -> CliResult {
    let id = parse_booking_id(args)?;
    let session = require_session(app)?;
    let store = load_bookings(app, &session).await?;

    store.send(BookingListAction::ResendConfirmation(id)).await?;
    let (panel, error) = store
        .state(|s| (s.notification.clone(), s.error.clone()))
        .await;
    match panel {
        Some(panel) => {
            let email = panel.notification.render();
            println!("{}\n\n{}", email.subject, email.body);
            Ok(())
        },
        None => Err(Box::new(BookingError::Validation(
            error.unwrap_or_else(|| format!("Booking {id} not found")),
        ))),
    }
}

async fn dashboard(app: &App) -> CliResult {
    let session = require_session(app)?;
    let (rooms, bookings) = tokio::join!(
        app.api.fetch_rooms(),
        app.api.fetch_my_bookings(&session.credentials())
    );

    let offset = app.config.utc_offset();
    let now = app.clock.now();
    let summary = DashboardSummary::compute(&RoomCatalog::new(rooms?), &bookings?, now, offset);

    println!("Welcome, {}", session.identity.user_name);
    println!(
        "Upcoming: {} ({} today, on {})",
        summary.upcoming_total,
        summary.today_count,
        local_date(now, offset)
    );
    for booking in &summary.upcoming {
        println!(
            "  {}  {}",
            booking.start_time.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            booking.room_name()
        );
    }
    if summary.has_more() {
        println!("  ... run `roombook bookings` to see all {}", summary.upcoming_total);
    }
    println!(
        "Rooms: {} ({} regular, {} amphitheaters)",
        summary.rooms.total, summary.rooms.regular, summary.rooms.amphitheater
    );
    Ok(())
}
