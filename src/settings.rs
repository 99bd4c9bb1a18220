use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::{CalendarPanel, EmbedOptions};

pub const DEFAULT_BUSINESS_NAME: &str = "Property PMS";

static RE_EDIT: OnceLock<Regex> = OnceLock::new();

fn re_edit() -> &'static Regex {
    RE_EDIT.get_or_init(|| Regex::new(r"/edit.*").expect("compile RE_EDIT"))
}

/// Turns a sheet's edit link into its read-only preview link.
///
/// `/edit` and everything after it becomes `/preview`. Links without `/edit`
/// are returned unchanged.
pub fn preview_url(sheet_url: &str) -> String {
    re_edit().replace(sheet_url, "/preview").into_owned()
}

// Columns are nullable in the backend; `null` and a missing column both mean "not configured".
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-user settings record. An empty string disables the linked feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub business_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logo_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub expense_form_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub expense_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub income_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub maintenance_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bookings_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contacts_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub regulatory_sheet_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub documentation_sheet_url: String,
    /// Raw calendar reference, stored exactly as the user typed it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub calendar_id: String,
}

impl Settings {
    pub fn display_name(&self) -> &str {
        if self.business_name.is_empty() {
            DEFAULT_BUSINESS_NAME
        } else {
            &self.business_name
        }
    }

    /// Configured links in sidebar order.
    pub fn sheet_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Income", self.income_sheet_url.as_str()),
            ("Expenses", self.expense_sheet_url.as_str()),
            ("Expense form", self.expense_form_url.as_str()),
            ("Bookings", self.bookings_sheet_url.as_str()),
            ("Maintenance", self.maintenance_sheet_url.as_str()),
            ("Regulations", self.regulatory_sheet_url.as_str()),
            ("Contacts", self.contacts_sheet_url.as_str()),
            ("Documentation", self.documentation_sheet_url.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .collect()
    }

    /// Sheets shown inline on their pages, as preview links.
    pub fn embedded_sheets(&self) -> Vec<(&'static str, String)> {
        [
            ("Regulations", self.regulatory_sheet_url.as_str()),
            ("Documentation", self.documentation_sheet_url.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(label, url)| (label, preview_url(url)))
        .collect()
    }

    pub fn calendar_panel(&self, options: &EmbedOptions) -> CalendarPanel {
        CalendarPanel::from_reference(&self.calendar_id, options)
    }
}
