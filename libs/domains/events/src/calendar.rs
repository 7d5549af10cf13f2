//! iCalendar and Google Calendar renderings of events.

use chrono::{DateTime, Utc};

use crate::models::Event;

const PRODUCT_ID: &str = "-//Campus Events//Events//EN";
const UID_DOMAIN: &str = "campus-events";
const GOOGLE_RENDER_URL: &str = "https://calendar.google.com/calendar/render";

/// Escapes iCalendar TEXT values. CRLF and lone CR count as line breaks.
pub fn escape_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// `(start, end)` as local `YYYYMMDDTHHMMSS`; a missing end time repeats the start.
fn local_range(event: &Event) -> (String, String) {
    let day = event.date.format("%Y%m%d");
    let start = event.start_time.format("%H%M%S").to_string();
    let end = event
        .end_time
        .map(|t| t.format("%H%M%S").to_string())
        .unwrap_or_else(|| start.clone());
    (format!("{}T{}", day, start), format!("{}T{}", day, end))
}

/// Calendar document with one VEVENT per event, CRLF line endings.
pub fn to_ics(events: &[Event], stamped_at: DateTime<Utc>) -> String {
    let dtstamp = stamped_at.format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    for event in events {
        let (start, end) = local_range(event);

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("DTSTART:{}", start));
        lines.push(format!("DTEND:{}", end));
        lines.push(format!("DTSTAMP:{}", dtstamp));
        lines.push(format!("SUMMARY:{}", escape_text(&event.name)));
        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if !event.location.is_empty() {
            lines.push(format!("LOCATION:{}", escape_text(&event.location)));
        }
        if let Some(url) = event.url.as_deref().filter(|u| !u.is_empty()) {
            lines.push(format!("URL:{}", url));
        }
        lines.push(format!("UID:{}@{}", event.id, UID_DOMAIN));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

/// "Add to Google Calendar" link prefilled with the event details.
pub fn google_calendar_url(event: &Event) -> String {
    let (start, end) = local_range(event);

    let details = [event.description.as_deref(), event.url.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let params = [
        ("action", "TEMPLATE".to_string()),
        ("text", event.name.clone()),
        ("dates", format!("{}/{}", start, end)),
        ("details", details),
        ("location", event.location.clone()),
    ];

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", GOOGLE_RENDER_URL, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use domain_submissions::ModerationState;
    use uuid::Uuid;

    fn event() -> Event {
        Event {
            id: Uuid::from_u128(7),
            club_handle: Some("uwchess".into()),
            url: Some("https://example.com/e/1".into()),
            name: "Chess, Tea; Talk".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            end_time: None,
            location: "SLC 2134".into(),
            price: None,
            food: None,
            registration: false,
            image_url: None,
            description: Some("Bring a board\nand a friend".into()),
            embedding: None,
            added_at: Utc::now(),
            club_type: None,
            reactions: serde_json::json!({}),
            notes: None,
            moderation: ModerationState::scraped(),
        }
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text(r"a\b;c,d"), r"a\\b\;c\,d");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
    }

    #[test]
    fn test_escape_text_normalizes_carriage_returns() {
        assert_eq!(escape_text("one\r\ntwo\rthree"), "one\\ntwo\\nthree");
        assert!(!escape_text("form\r\ntext").contains('\r'));
    }

    #[test]
    fn test_ics_document() {
        let stamp = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let ics = to_ics(&[event()], stamp);
        let lines: Vec<&str> = ics.split("\r\n").collect();

        assert_eq!(
            lines,
            vec![
                "BEGIN:VCALENDAR",
                "VERSION:2.0",
                "PRODID:-//Campus Events//Events//EN",
                "CALSCALE:GREGORIAN",
                "BEGIN:VEVENT",
                "DTSTART:20261103T183000",
                "DTEND:20261103T183000",
                "DTSTAMP:20261016T120000Z",
                "SUMMARY:Chess\\, Tea\\; Talk",
                "DESCRIPTION:Bring a board\\nand a friend",
                "LOCATION:SLC 2134",
                "URL:https://example.com/e/1",
                "UID:00000000-0000-0000-0000-000000000007@campus-events",
                "END:VEVENT",
                "END:VCALENDAR",
            ]
        );
        assert!(!ics.ends_with("\r\n"));
    }

    #[test]
    fn test_ics_omits_empty_optionals() {
        let mut plain = event();
        plain.description = None;
        plain.url = None;
        plain.end_time = NaiveTime::from_hms_opt(20, 0, 0);

        let ics = to_ics(&[plain], Utc::now());
        assert!(ics.contains("DTEND:20261103T200000"));
        assert!(!ics.contains("DESCRIPTION:"));
        assert!(!ics.contains("URL:"));
    }

    #[test]
    fn test_google_calendar_url() {
        let url = google_calendar_url(&event());

        assert!(url.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE&"));
        assert!(url.contains("text=Chess%2C%20Tea%3B%20Talk"));
        assert!(url.contains("dates=20261103T183000%2F20261103T183000"));
        assert!(url.contains(
            "details=Bring%20a%20board%0Aand%20a%20friend%0A%0Ahttps%3A%2F%2Fexample.com%2Fe%2F1"
        ));
        assert!(url.ends_with("location=SLC%202134"));
    }
}
