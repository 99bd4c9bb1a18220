use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use urlencoding::encode;

use super::models::{BookingRecord, CalendarUpdate, ExpenseRecord, IncomeRecord, Property};
use crate::{session::Session, settings::Settings};

/// PostgREST client for the dashboard tables. Every call takes the session
/// explicitly.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, anon_key)
    }

    pub fn with_client(client: Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}?{}", self.rest_url, table, query);
        debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(&url), session)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to query '{}'. URL: {}", table, url))?;

        let response = ensure_success(response, table).await?;

        response
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("Failed to parse rows from '{}'", table))
    }

    /// Loads the signed-in user's settings. A missing row is an all-empty record.
    pub async fn load_settings(&self, session: &Session) -> Result<Settings> {
        let rows: Vec<Settings> = self
            .select(
                session,
                "user_settings",
                &format!("id=eq.{}&select=*", encode(&session.user_id)),
            )
            .await?;

        match rows.into_iter().next() {
            Some(settings) => Ok(settings),
            None => {
                debug!("No settings row for {}, using defaults", session.user_id);
                Ok(Settings::default())
            }
        }
    }

    /// Stores the raw calendar reference as typed, not its resolved form.
    pub async fn save_calendar_reference(&self, session: &Session, raw: &str) -> Result<()> {
        let url = format!("{}/user_settings", self.rest_url);
        let update = CalendarUpdate {
            id: &session.user_id,
            calendar_id: raw,
            updated_at: Utc::now(),
        };

        let response = self
            .authorized(self.client.post(&url), session)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&update)
            .send()
            .await
            .context("Failed to save calendar ID")?;

        ensure_success(response, "user_settings").await?;
        info!("Calendar ID saved for {}", session.user_id);
        Ok(())
    }

    pub async fn load_property(&self, session: &Session) -> Result<Option<Property>> {
        let rows: Vec<Property> = self
            .select(
                session,
                "properties",
                &format!("user_id=eq.{}&select=*&limit=1", encode(&session.user_id)),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn load_income(
        &self,
        session: &Session,
        property_id: &str,
    ) -> Result<Vec<IncomeRecord>> {
        self.select(
            session,
            "income",
            &format!("property_id=eq.{}&select=net_income", encode(property_id)),
        )
        .await
    }

    pub async fn load_expenses(
        &self,
        session: &Session,
        property_id: &str,
    ) -> Result<Vec<ExpenseRecord>> {
        self.select(
            session,
            "expenses",
            &format!("property_id=eq.{}&select=amount", encode(property_id)),
        )
        .await
    }

    pub async fn load_bookings(
        &self,
        session: &Session,
        property_id: &str,
    ) -> Result<Vec<BookingRecord>> {
        self.select(
            session,
            "bookings",
            &format!("property_id=eq.{}&select=check_in_date", encode(property_id)),
        )
        .await
    }
}

async fn ensure_success(response: Response, table: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    bail!(
        "Request to '{}' failed with status {} and body of:\n{}",
        table,
        status,
        body
    )
}
