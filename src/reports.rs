//! # Reports Module
//!
//! Document export for the revenue screen: a self-contained HTML mission
//! report (the app converts it to a shareable file) and a CSV payment
//! export. Both render from in-memory data handed in by the caller.
//!
//! Payment records are sample data, not a persisted collection — the
//! revenue screen has always shipped with a hardcoded ledger.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::missions::Mission;
use crate::users::User;

/// A payment line on the revenue screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Ledger row id
    pub id: i64,
    /// Payment date, ISO date string
    pub date: String,
    /// Mission the payment is for
    pub mission_title: String,
    /// Paying client
    pub client: String,
    /// Amount in the app's display currency
    pub amount: f64,
    /// `paid` or `pending`
    pub status: String,
}

/// The hardcoded payment ledger shown on the revenue screen
pub fn sample_payments() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            id: 1,
            date: "2026-07-02".into(),
            mission_title: "HVAC inspection".into(),
            client: "Altair Facilities".into(),
            amount: 1200.0,
            status: "paid".into(),
        },
        PaymentRecord {
            id: 2,
            date: "2026-07-18".into(),
            mission_title: "Server room rewiring".into(),
            client: "Nexa Logistics".into(),
            amount: 2450.0,
            status: "paid".into(),
        },
        PaymentRecord {
            id: 3,
            date: "2026-08-05".into(),
            mission_title: "Fire panel maintenance".into(),
            client: "Groupe Verdier".into(),
            amount: 860.0,
            status: "pending".into(),
        },
        PaymentRecord {
            id: 4,
            date: "2026-08-21".into(),
            mission_title: "Elevator diagnostics".into(),
            client: "Altair Facilities".into(),
            amount: 1730.0,
            status: "pending".into(),
        },
    ]
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the mission report as a self-contained HTML document.
///
/// Technicians are resolved from `users` at render time; a dangling
/// assignment shows as "Unassigned", matching how the screens tolerate
/// deleted users everywhere else.
pub fn missions_html(missions: &[Mission], users: &[User]) -> String {
    let mut rows = String::new();
    for mission in missions {
        let technician = mission
            .assigned_to_user_id
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map(|u| u.display_name())
            .unwrap_or_else(|| "Unassigned".into());

        rows.push_str(&format!(
            "      <tr>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{}</td>\n        <td class=\"amount\">{:.2}</td>\n      </tr>\n",
            escape_html(&mission.title),
            escape_html(&mission.location),
            escape_html(&technician),
            escape_html(&mission.start_date),
            mission.status.as_str(),
            mission.budget,
        ));
    }

    let total: f64 = missions.iter().map(|m| m.budget).sum();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Mission Report</title>\n\
         <style>\n\
         body {{ font-family: Helvetica, Arial, sans-serif; margin: 24px; color: #1a1a2e; }}\n\
         h1 {{ font-size: 20px; }}\n\
         table {{ width: 100%; border-collapse: collapse; margin-top: 16px; }}\n\
         th, td {{ border: 1px solid #d0d0e0; padding: 6px 10px; font-size: 12px; text-align: left; }}\n\
         th {{ background: #f0f0f8; }}\n\
         td.amount {{ text-align: right; }}\n\
         tfoot td {{ font-weight: bold; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <h1>Mission Report</h1>\n\
         <p>{count} mission(s)</p>\n\
         <table>\n\
         <thead>\n\
         <tr><th>Title</th><th>Location</th><th>Technician</th><th>Start</th><th>Status</th><th>Budget</th></tr>\n\
         </thead>\n\
         <tbody>\n{rows}    </tbody>\n\
         <tfoot>\n\
         <tr><td colspan=\"5\">Total</td><td class=\"amount\">{total:.2}</td></tr>\n\
         </tfoot>\n\
         </table>\n\
         </body>\n\
         </html>\n",
        count = missions.len(),
        rows = rows,
        total = total,
    )
}

/// Render a payment ledger as CSV, header row included.
pub fn payments_csv(payments: &[PaymentRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for payment in payments {
        writer
            .serialize(payment)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::SerializationError(e.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
