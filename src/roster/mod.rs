//! User roster importer and analyzer.
//!
//! Parses a roster file (semicolon CSV with `LOGIN`, `ADMIN`, `NOM`,
//! `PRENOM` columns) into [`User`] records and runs a set of independent
//! diagnostic rules over the logins. No rule halts the others; the caller
//! receives the full warning list.
//!
//! # Counting conventions
//!
//! - `DUPLICATED_LOGINS`: count is the total number of occurrences of
//!   logins that appear at least twice (two identical `jdupont` rows give
//!   count 2).
//! - `TOO_CLOSE_LOGINS`: count is the number of unordered pairs of distinct
//!   logins with Jaro-Winkler similarity at or above
//!   [`SIMILARITY_THRESHOLD`], a likely-typo signal.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use strsim::jaro_winkler;

use crate::error::{RosterError, RosterResult};
use crate::reader::{read_file_auto, Cell, ReadResult};

/// Two distinct logins at or above this similarity are flagged as too close.
pub const SIMILARITY_THRESHOLD: f64 = 0.92;

/// Structural validity pattern for logins.
static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9._-]{2,31}$").expect("invalid login pattern"));

// =============================================================================
// Users
// =============================================================================

/// One roster entry.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub login: String,
    pub is_admin: bool,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
}

// =============================================================================
// Warnings
// =============================================================================

/// Diagnostic code for a roster warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    DuplicatedLogins,
    TooCloseLogins,
    InvalidLogin,
    NoAdmin,
    NoUser,
}

/// One roster warning with its count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
    pub count: usize,
}

/// Result of a roster import and analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RosterReport {
    pub users: Vec<User>,
    pub warnings: Vec<Warning>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a read roster matrix into user records.
///
/// `LOGIN` and `ADMIN` columns are required; `NOM`/`PRENOM` are optional.
/// Rows with a blank login are skipped.
pub fn parse_roster(read: &ReadResult) -> RosterResult<Vec<User>> {
    let header = read.header();
    let column = |title: &str| header.iter().position(|c| c.trim().eq_ignore_ascii_case(title));

    let login_column =
        column("LOGIN").ok_or_else(|| RosterError::MissingColumn("LOGIN".into()))?;
    let admin_column =
        column("ADMIN").ok_or_else(|| RosterError::MissingColumn("ADMIN".into()))?;
    let last_name_column = column("NOM");
    let first_name_column = column("PRENOM");

    let text_at = |row: &[Cell], index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .and_then(Cell::as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let users: Vec<User> = read
        .rows()
        .iter()
        .filter_map(|row| {
            let login = text_at(row, Some(login_column))?;
            let is_admin = match row.get(admin_column) {
                Some(Cell::Bool(b)) => *b,
                Some(Cell::Number(n)) => *n != 0.0,
                Some(Cell::Text(s)) => matches!(
                    s.trim().to_lowercase().as_str(),
                    "1" | "oui" | "yes" | "x" | "admin"
                ),
                _ => false,
            };
            Some(User {
                login,
                is_admin,
                last_name: text_at(row, last_name_column),
                first_name: text_at(row, first_name_column),
            })
        })
        .collect();

    if users.is_empty() {
        return Err(RosterError::EmptyRoster);
    }
    Ok(users)
}

// =============================================================================
// Analysis
// =============================================================================

/// Run all diagnostic rules over the roster.
///
/// Rules are independent; a warning is emitted only for triggered codes,
/// at most one warning per code.
pub fn analyze(users: &[User]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
    for user in users {
        *occurrences.entry(user.login.as_str()).or_default() += 1;
    }

    let duplicated: usize = occurrences.values().filter(|c| **c >= 2).sum();
    if duplicated > 0 {
        warnings.push(Warning {
            code: WarningCode::DuplicatedLogins,
            count: duplicated,
        });
    }

    // Pairwise scan over distinct logins only; identical logins are already
    // covered by the duplicate rule.
    let distinct: Vec<&str> = occurrences.keys().copied().collect();
    let mut too_close = 0;
    for i in 0..distinct.len() {
        for j in (i + 1)..distinct.len() {
            if jaro_winkler(distinct[i], distinct[j]) >= SIMILARITY_THRESHOLD {
                too_close += 1;
            }
        }
    }
    if too_close > 0 {
        warnings.push(Warning {
            code: WarningCode::TooCloseLogins,
            count: too_close,
        });
    }

    let invalid = users
        .iter()
        .filter(|u| !LOGIN_PATTERN.is_match(&u.login))
        .count();
    if invalid > 0 {
        warnings.push(Warning {
            code: WarningCode::InvalidLogin,
            count: invalid,
        });
    }

    if !users.iter().any(|u| u.is_admin) {
        warnings.push(Warning {
            code: WarningCode::NoAdmin,
            count: 0,
        });
    }
    if !users.iter().any(|u| !u.is_admin) {
        warnings.push(Warning {
            code: WarningCode::NoUser,
            count: 0,
        });
    }

    warnings
}

/// Import a roster file and analyze it.
pub async fn analyze_file<P: AsRef<Path>>(path: P) -> RosterResult<RosterReport> {
    let read = read_file_auto(path).await?;
    let users = parse_roster(&read)?;
    let warnings = analyze(&users);
    log::info!(
        "roster: {} user(s), {} warning(s)",
        users.len(),
        warnings.len()
    );
    Ok(RosterReport { users, warnings })
}
