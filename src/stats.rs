use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};

use crate::{
    session::Session,
    supabase::{
        SupabaseClient,
        models::{BookingRecord, ExpenseRecord, IncomeRecord},
    },
};

/// Numbers shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub upcoming_bookings: usize,
}

impl DashboardStats {
    pub fn compute(
        income: &[IncomeRecord],
        expenses: &[ExpenseRecord],
        bookings: &[BookingRecord],
        today: NaiveDate,
    ) -> Self {
        let total_income: f64 = income.iter().map(|i| i.net_income).sum();
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let upcoming_bookings = bookings
            .iter()
            .filter(|b| b.check_in_date >= today)
            .count();

        Self {
            total_income,
            total_expenses,
            net_income: total_income - total_expenses,
            upcoming_bookings,
        }
    }
}

pub async fn load_dashboard_stats(
    client: &SupabaseClient,
    session: &Session,
    today: NaiveDate,
) -> Result<DashboardStats> {
    let Some(property) = client
        .load_property(session)
        .await
        .context("Failed to load property")?
    else {
        info!("No property configured for {}", session.user_id);
        return Ok(DashboardStats::default());
    };

    debug!("Loading stats for property {}", property.id);
    let (income, expenses, bookings) = futures::try_join!(
        client.load_income(session, &property.id),
        client.load_expenses(session, &property.id),
        client.load_bookings(session, &property.id),
    )?;

    Ok(DashboardStats::compute(&income, &expenses, &bookings, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn totals_and_upcoming_bookings() {
        let income = vec![
            IncomeRecord { net_income: 1200.5 },
            IncomeRecord { net_income: 799.5 },
        ];
        let expenses = vec![ExpenseRecord { amount: 250.0 }];
        let bookings = vec![
            BookingRecord { check_in_date: date("2026-10-01") },
            BookingRecord { check_in_date: date("2026-10-18") },
            BookingRecord { check_in_date: date("2026-11-02") },
        ];

        let stats = DashboardStats::compute(&income, &expenses, &bookings, date("2026-10-18"));

        assert_eq!(stats.total_income, 2000.0);
        assert_eq!(stats.total_expenses, 250.0);
        assert_eq!(stats.net_income, 1750.0);
        assert_eq!(stats.upcoming_bookings, 2);
    }

    #[test]
    fn empty_tables_give_zeroes() {
        let stats = DashboardStats::compute(&[], &[], &[], date("2026-01-01"));
        assert_eq!(stats, DashboardStats::default());
    }
}
