//! Confirmation e-mail rendering
//!
//! Sending is simulated by the reducers; this module only turns a receipt
//! or a booked slot into subject and plain-text body, in English or French.

use crate::types::{BookedSlot, BookingId, Identity, Language, TimeSlot};
use crate::wizard::Receipt;
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Weekday};
use std::fmt::Write as _;

struct Strings {
    confirmed_title: &'static str,
    cancelled_title: &'static str,
    hello: &'static str,
    confirmed_text: &'static str,
    cancelled_text: &'static str,
    room: &'static str,
    date: &'static str,
    time: &'static str,
    status: &'static str,
    confirmed: &'static str,
    cancelled: &'static str,
    booking_id: &'static str,
    additional_info: &'static str,
    regards: &'static str,
    team_name: &'static str,
}

const EN: Strings = Strings {
    confirmed_title: "Booking Confirmed",
    cancelled_title: "Booking Cancelled",
    hello: "Hello",
    confirmed_text: "Your booking has been confirmed with the following details:",
    cancelled_text: "Your booking has been cancelled. Details:",
    room: "Room",
    date: "Date",
    time: "Time",
    status: "Status",
    confirmed: "Confirmed",
    cancelled: "Cancelled",
    booking_id: "Booking ID",
    additional_info: "If you need to make any changes to your booking, please contact us.",
    regards: "Regards",
    team_name: "The Room Booking Team",
};

const FR: Strings = Strings {
    confirmed_title: "Réservation Confirmée",
    cancelled_title: "Réservation Annulée",
    hello: "Bonjour",
    confirmed_text: "Votre réservation a été confirmée avec les détails suivants:",
    cancelled_text: "Votre réservation a été annulée. Détails:",
    room: "Salle",
    date: "Date",
    time: "Heure",
    status: "Statut",
    confirmed: "Confirmée",
    cancelled: "Annulée",
    booking_id: "ID de Réservation",
    additional_info: "Si vous souhaitez apporter des modifications à votre réservation, veuillez nous contacter.",
    regards: "Cordialement",
    team_name: "L'équipe de Réservation de Salles",
};

const fn strings(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Fr => &FR,
    }
}

/// Rendered e-mail
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Recipient address, when known
    pub to: Option<String>,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// What a confirmation e-mail talks about
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Output language
    pub language: Language,
    /// Greeting name
    pub recipient: String,
    /// Recipient address
    pub email: Option<String>,
    /// Room display name
    pub room: String,
    /// Day
    pub date: NaiveDate,
    /// Time ranges, contiguous hours merged
    pub times: Vec<(NaiveTime, NaiveTime)>,
    /// Booking was cancelled
    pub cancelled: bool,
    /// Bookings covered
    pub booking_ids: Vec<BookingId>,
}

impl Notification {
    /// Confirmation for a batch just booked through the wizard
    #[must_use]
    pub fn from_receipt(receipt: &Receipt, recipient: &Identity, language: Language) -> Self {
        Self {
            language,
            recipient: recipient.user_name.clone(),
            email: Some(recipient.email.clone()).filter(|e| !e.is_empty()),
            room: receipt.room_name.clone(),
            date: receipt.date,
            times: merge_slots(&receipt.slots),
            cancelled: false,
            booking_ids: receipt.booking_ids(),
        }
    }

    /// Confirmation (or cancellation notice) for one listed booking
    #[must_use]
    pub fn from_booking(booking: &BookedSlot, offset: FixedOffset, language: Language) -> Self {
        let start = booking.start_time.with_timezone(&offset);
        let end = booking.end_time.with_timezone(&offset);
        Self {
            language,
            recipient: booking.owner.user_name.clone(),
            email: booking.owner.email.clone(),
            room: booking.room_name(),
            date: start.date_naive(),
            times: vec![(start.time(), end.time())],
            cancelled: booking.is_cancelled(),
            booking_ids: vec![booking.id],
        }
    }

    /// Subject and body
    #[must_use]
    pub fn render(&self) -> RenderedEmail {
        let s = strings(self.language);
        let title = if self.cancelled { s.cancelled_title } else { s.confirmed_title };

        let times = self
            .times
            .iter()
            .map(|(start, end)| format!("{} - {}", start.format("%H:%M"), end.format("%H:%M")))
            .collect::<Vec<_>>()
            .join(", ");
        let ids = self
            .booking_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let mut body = String::new();
        let _ = writeln!(body, "{title}\n");
        let _ = writeln!(body, "{} {},\n", s.hello, self.recipient);
        let _ = writeln!(
            body,
            "{}\n",
            if self.cancelled { s.cancelled_text } else { s.confirmed_text }
        );
        let _ = writeln!(body, "{}: {}", s.room, self.room);
        let _ = writeln!(body, "{}: {}", s.date, format_date(self.date, self.language));
        let _ = writeln!(body, "{}: {times}", s.time);
        let _ = writeln!(
            body,
            "{}: {}",
            s.status,
            if self.cancelled { s.cancelled } else { s.confirmed }
        );
        if !ids.is_empty() {
            let _ = writeln!(body, "{}: {ids}", s.booking_id);
        }
        let _ = writeln!(body, "\n{}\n", s.additional_info);
        let _ = writeln!(body, "{},", s.regards);
        let _ = write!(body, "{}", s.team_name);

        RenderedEmail {
            to: self.email.clone(),
            subject: format!("{title}: {} {}", self.room, self.date),
            body,
        }
    }
}

/// Contiguous hours as one range: [09, 10, 14] → 09-11, 14-15
fn merge_slots(slots: &[TimeSlot]) -> Vec<(NaiveTime, NaiveTime)> {
    let mut hours: Vec<u32> = slots.iter().map(|slot| slot.start_hour()).collect();
    hours.sort_unstable();
    hours.dedup();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for hour in hours {
        match ranges.last_mut() {
            Some((_, end)) if *end == hour => *end = hour + 1,
            _ => ranges.push((hour, hour + 1)),
        }
    }

    ranges
        .into_iter()
        .filter_map(|(start, end)| {
            Some((NaiveTime::from_hms_opt(start, 0, 0)?, NaiveTime::from_hms_opt(end, 0, 0)?))
        })
        .collect()
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const FR_MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

const fn weekday_name(weekday: Weekday, language: Language) -> &'static str {
    match (language, weekday) {
        (Language::En, Weekday::Mon) => "Monday",
        (Language::En, Weekday::Tue) => "Tuesday",
        (Language::En, Weekday::Wed) => "Wednesday",
        (Language::En, Weekday::Thu) => "Thursday",
        (Language::En, Weekday::Fri) => "Friday",
        (Language::En, Weekday::Sat) => "Saturday",
        (Language::En, Weekday::Sun) => "Sunday",
        (Language::Fr, Weekday::Mon) => "lundi",
        (Language::Fr, Weekday::Tue) => "mardi",
        (Language::Fr, Weekday::Wed) => "mercredi",
        (Language::Fr, Weekday::Thu) => "jeudi",
        (Language::Fr, Weekday::Fri) => "vendredi",
        (Language::Fr, Weekday::Sat) => "samedi",
        (Language::Fr, Weekday::Sun) => "dimanche",
    }
}

/// "Thursday, January 16, 2025" / "jeudi 16 janvier 2025"
#[must_use]
pub fn format_date(date: NaiveDate, language: Language) -> String {
    let weekday = weekday_name(date.weekday(), language);
    let month_index = date.month0() as usize;
    match language {
        Language::En => format!("{weekday}, {} {}, {}", EN_MONTHS[month_index], date.day(), date.year()),
        Language::Fr => format!("{weekday} {} {} {}", date.day(), FR_MONTHS[month_index], date.year()),
    }
}
