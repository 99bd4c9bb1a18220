use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Property {
    pub id: String,
    pub property_name: String,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub google_calendar_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomeRecord {
    pub net_income: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpenseRecord {
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingRecord {
    pub check_in_date: NaiveDate,
}

// --------------------------------------------------

/// Partial `user_settings` upsert; columns not listed keep their stored value.
#[derive(Debug, Serialize)]
pub struct CalendarUpdate<'a> {
    pub id: &'a str,
    pub calendar_id: &'a str,
    pub updated_at: DateTime<Utc>,
}
