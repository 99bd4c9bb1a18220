use std::{fmt, str::FromStr, sync::OnceLock};

use anyhow::{Result, bail};
use log::debug;
use regex::Regex;
use urlencoding::{decode, encode};

pub const EMBED_BASE_URL: &str = "https://calendar.google.com/calendar/embed";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

static RE_ICAL: OnceLock<Regex> = OnceLock::new();
static RE_SRC: OnceLock<Regex> = OnceLock::new();

fn re_ical() -> &'static Regex {
    RE_ICAL.get_or_init(|| Regex::new(r"ical/([^/]+)/").expect("compile RE_ICAL"))
}

fn re_src() -> &'static Regex {
    RE_SRC.get_or_init(|| Regex::new(r"src=([^&]+)").expect("compile RE_SRC"))
}

/// Turns whatever the user pasted into the calendar field into a calendar id.
///
/// Accepts a bare id, an iCal feed address (`.../ical/<id>/public/basic.ics`)
/// or an embed URL (`...embed?src=<id>&...`). The iCal shape is checked first.
/// Anything else comes back unchanged.
pub fn resolve_identifier(raw: &str) -> String {
    if let Some(caps) = re_ical().captures(raw) {
        // The feed path keeps the id percent-encoded; it is returned as is.
        return caps[1].to_string();
    }

    if let Some(caps) = re_src().captures(raw) {
        let encoded = &caps[1];
        return match decode(encoded) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                debug!("Keeping undecoded src parameter '{}': {}", encoded, e);
                encoded.to_string()
            }
        };
    }

    raw.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Agenda,
}

impl ViewMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            ViewMode::Month => "MONTH",
            ViewMode::Week => "WEEK",
            ViewMode::Agenda => "AGENDA",
        }
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MONTH" => Ok(ViewMode::Month),
            "WEEK" => Ok(ViewMode::Week),
            "AGENDA" => Ok(ViewMode::Agenda),
            _ => bail!("Unknown calendar view mode '{}'", s),
        }
    }
}

/// Display options serialized into the embed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    pub mode: ViewMode,
    pub show_nav: bool,
    pub time_zone: String,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            mode: ViewMode::Month,
            show_nav: true,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

/// Builds the Google Calendar embed URL for a canonical id.
///
/// Returns `None` for an empty id, meaning there is nothing to display.
pub fn build_embed_url(identifier: &str, options: &EmbedOptions) -> Option<String> {
    if identifier.is_empty() {
        return None;
    }

    Some(format!(
        "{}?src={}&mode={}&showTitle=0&showNav={}&showDate=1&showPrint=0&showTabs=1&showCalendars=0&showTz=0&ctz={}",
        EMBED_BASE_URL,
        encode(identifier),
        options.mode.as_param(),
        if options.show_nav { 1 } else { 0 },
        encode(&options.time_zone),
    ))
}

/// What the dashboard shows in its calendar card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarPanel {
    Embed { url: String },
    NotConfigured,
}

impl CalendarPanel {
    pub fn from_reference(raw: &str, options: &EmbedOptions) -> Self {
        let identifier = resolve_identifier(raw);
        match build_embed_url(&identifier, options) {
            Some(url) => CalendarPanel::Embed { url },
            None => CalendarPanel::NotConfigured,
        }
    }
}

impl fmt::Display for CalendarPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarPanel::Embed { url } => write!(f, "{}", url),
            CalendarPanel::NotConfigured => write!(f, "No calendar to display."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifiers_pass_through() {
        for s in [
            "plainuser@gmail.com",
            "abc123@group.calendar.google.com",
            "not a url at all",
            "https://example.com/calendar?id=1",
        ] {
            assert_eq!(resolve_identifier(s), s);
        }
    }

    #[test]
    fn ical_segment_is_captured_verbatim() {
        let s = "https://calendar.google.com/calendar/ical/abc%40group.calendar.google.com/public/basic.ics";
        assert_eq!(resolve_identifier(s), "abc%40group.calendar.google.com");
    }

    #[test]
    fn src_parameter_is_decoded() {
        let s = "https://calendar.google.com/calendar/embed?src=abc%40gmail.com&mode=MONTH";
        assert_eq!(resolve_identifier(s), "abc@gmail.com");
    }

    #[test]
    fn src_parameter_at_end_of_string() {
        let s = "https://calendar.google.com/calendar/embed?ctz=UTC&src=team%40example.com";
        assert_eq!(resolve_identifier(s), "team@example.com");
    }

    #[test]
    fn ical_wins_over_src() {
        let s = "https://calendar.google.com/calendar/ical/first%40gmail.com/basic.ics?src=second%40gmail.com";
        assert_eq!(resolve_identifier(s), "first%40gmail.com");
    }

    #[test]
    fn ical_without_segment_falls_back_to_src() {
        let s = "ical//public?src=owner%40gmail.com";
        assert_eq!(resolve_identifier(s), "owner@gmail.com");
    }

    #[test]
    fn ical_without_trailing_slash_is_not_a_match() {
        assert_eq!(resolve_identifier("ical/abc"), "ical/abc");
    }

    #[test]
    fn invalid_utf8_in_src_is_kept_encoded() {
        assert_eq!(resolve_identifier("embed?src=%FF%FE&x=1"), "%FF%FE");
    }

    #[test]
    fn empty_reference_yields_no_url() {
        assert_eq!(resolve_identifier(""), "");
        assert_eq!(build_embed_url("", &EmbedOptions::default()), None);
        assert_eq!(
            CalendarPanel::from_reference("", &EmbedOptions::default()),
            CalendarPanel::NotConfigured
        );
    }

    #[test]
    fn resolving_twice_can_change_the_result() {
        let s = "https://calendar.google.com/calendar/embed?src=https%3A%2F%2Fh%2Fical%2Finner%2Fbasic";
        let once = resolve_identifier(s);
        assert_eq!(once, "https://h/ical/inner/basic");
        assert_eq!(resolve_identifier(&once), "inner");
    }

    #[test]
    fn embed_url_uses_default_options() {
        let url = build_embed_url("abc@gmail.com", &EmbedOptions::default()).unwrap();
        assert_eq!(
            url,
            "https://calendar.google.com/calendar/embed?src=abc%40gmail.com&mode=MONTH&showTitle=0&showNav=1&showDate=1&showPrint=0&showTabs=1&showCalendars=0&showTz=0&ctz=America%2FNew_York"
        );
    }

    #[test]
    fn embed_url_contains_identifier_once_as_src() {
        let options = EmbedOptions {
            mode: ViewMode::Agenda,
            show_nav: false,
            time_zone: "Europe/Berlin".to_string(),
        };
        let id = "weird&src=id@example.com";
        let url = build_embed_url(id, &options).unwrap();
        let encoded = encode(id).into_owned();

        assert_eq!(url.matches("src=").count(), 1);
        assert_eq!(url.matches(encoded.as_str()).count(), 1);
        assert!(url.contains(&format!("?src={}&", encoded)));
        assert!(url.contains("mode=AGENDA"));
        assert!(url.contains("showNav=0"));
        assert!(url.ends_with("ctz=Europe%2FBerlin"));
    }

    #[test]
    fn panel_from_ical_reference() {
        let panel = CalendarPanel::from_reference(
            "https://calendar.google.com/calendar/ical/owner%40gmail.com/public/basic.ics",
            &EmbedOptions::default(),
        );
        match panel {
            CalendarPanel::Embed { url } => {
                // The captured id was still encoded, so it gets encoded again.
                assert!(url.contains("src=owner%2540gmail.com&"));
            }
            CalendarPanel::NotConfigured => panic!("expected an embed url"),
        }
    }

    #[test]
    fn view_mode_parsing() {
        assert_eq!("week".parse::<ViewMode>().unwrap(), ViewMode::Week);
        assert_eq!("MONTH".parse::<ViewMode>().unwrap(), ViewMode::Month);
        assert!("daily".parse::<ViewMode>().is_err());
        assert_eq!(
            CalendarPanel::NotConfigured.to_string(),
            "No calendar to display."
        );
    }
}
