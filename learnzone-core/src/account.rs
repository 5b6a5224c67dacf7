//! Local account record: registration, login and mock payment.
//!
//! The platform keeps exactly one registered student record on the
//! device, as a JSON blob under a fixed key in a small SQLite key/value
//! table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_store (
//!     key        TEXT PRIMARY KEY,
//!     value      BLOB NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```
//!
//! There is no schema versioning and no real payment processing: paying
//! only checks that the card form is filled in and then materializes the
//! student profile from the stored record.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PersistenceConfig;
use crate::error::{LearnZoneError, Result};

/// Key under which the registered student record is stored.
pub const ACCOUNT_KEY: &str = "registered_student_account";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    value      BLOB NOT NULL,
    updated_at TEXT NOT NULL
);";

// ---------------------------------------------------------------------------
// Plans & roles
// ---------------------------------------------------------------------------

/// Subscription plans offered on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubscriptionPlan {
    /// Entry plan.
    #[default]
    Basic,
    /// Mid-tier plan.
    Standard,
    /// Top plan.
    #[serde(rename = "VIP")]
    Vip,
}

impl SubscriptionPlan {
    /// All plans, cheapest first.
    #[must_use]
    pub fn all() -> &'static [SubscriptionPlan] {
        &[Self::Basic, Self::Standard, Self::Vip]
    }

    /// Display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Basic => "Basic plan",
            Self::Standard => "Standard plan",
            Self::Vip => "VIP plan",
        }
    }

    /// Monthly price in Egyptian pounds.
    #[must_use]
    pub fn monthly_price(self) -> u32 {
        match self {
            Self::Basic => 40,
            Self::Standard => 70,
            Self::Vip => 100,
        }
    }

    /// Feature bullets shown on the pricing card.
    #[must_use]
    pub fn features(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &[
                "Access to theory courses",
                "Switch course once",
                "Up to 30 students per practical course",
            ],
            Self::Standard => &[
                "Everything in Basic",
                "Switch course twice",
                "Up to 15 students per practical course",
                "Faster AI assistant",
            ],
            Self::Vip => &[
                "Everything in Standard",
                "Switch course 5 times",
                "Up to 10 students per practical course",
                "Private review sessions",
                "Premium certificate",
            ],
        }
    }

    /// Whether this is the highlighted plan.
    #[must_use]
    pub fn is_featured(self) -> bool {
        self == Self::Standard
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Basic => "Basic",
            Self::Standard => "Standard",
            Self::Vip => "VIP",
        };
        f.write_str(key)
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Self::Basic),
            "Standard" => Ok(Self::Standard),
            "VIP" => Ok(Self::Vip),
            _ => Err(format!("unknown plan: '{s}'")),
        }
    }
}

/// Platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Not logged in.
    Guest,
    /// Student dashboard and learning zone.
    Student,
    /// Teacher dashboard.
    Teacher,
    /// Admin dashboard.
    Admin,
}

/// A logged-in user as the dashboards see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Numeric user id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: UserRole,
    /// Plan (students only).
    pub plan: Option<SubscriptionPlan>,
    /// Points balance (students only).
    pub points: Option<u32>,
    /// Leaderboard rank (students only).
    pub rank: Option<u32>,
}

const STUDENT_ID: u32 = 1;
const STUDENT_POINTS: u32 = 480;
const STUDENT_RANK: u32 = 125;
const TEACHER_ID: u32 = 101;

// ---------------------------------------------------------------------------
// Forms & record
// ---------------------------------------------------------------------------

/// The stored registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Student's full name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password; this is a local mock, not an auth system.
    pub password: String,
    /// Age as typed.
    pub age: String,
    /// Chosen plan.
    #[serde(default)]
    pub plan: SubscriptionPlan,
}

/// Registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Full name.
    pub full_name: String,
    /// Email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Age.
    pub age: String,
    /// Plan selected on the pricing page.
    pub plan: SubscriptionPlan,
}

/// Card form input on the payment page.
#[derive(Debug, Clone, Default)]
pub struct PaymentDetails {
    /// Name on card.
    pub card_name: String,
    /// Card number.
    pub card_number: String,
    /// Expiry (MM/YY).
    pub expiry: String,
    /// CVC.
    pub cvc: String,
}

impl PaymentDetails {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("card_name", &self.card_name),
            ("card_number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvc", &self.cvc),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// ---------------------------------------------------------------------------
// AccountStore
// ---------------------------------------------------------------------------

/// Handle to the local key/value store holding the account record.
pub struct AccountStore {
    conn: Connection,
    db_path: PathBuf,
}

impl fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl AccountStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns [`LearnZoneError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), wal = config.wal_mode, "Account store opened");
        Ok(Self { conn, db_path })
    }

    /// Open an in-memory store (useful for tests).
    ///
    /// # Errors
    /// Returns [`LearnZoneError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path of the backing database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Register a student, replacing any previously stored record.
    ///
    /// # Errors
    /// - `InvalidInput` if name, email or password is blank.
    /// - `PasswordMismatch` if the confirmation differs.
    pub fn register(&self, form: &RegistrationForm) -> Result<AccountRecord> {
        for (field, value) in [
            ("full_name", &form.full_name),
            ("email", &form.email),
            ("password", &form.password),
        ] {
            if value.trim().is_empty() {
                return Err(LearnZoneError::InvalidInput(format!("{field} is required")));
            }
        }
        if form.password != form.confirm_password {
            return Err(LearnZoneError::PasswordMismatch);
        }

        let record = AccountRecord {
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
            age: form.age.clone(),
            plan: form.plan,
        };
        self.put(ACCOUNT_KEY, &record)?;
        info!(plan = %record.plan, "Student registered");
        Ok(record)
    }

    /// The stored registration record, if any.
    ///
    /// # Errors
    /// `Serialization` if the stored blob is not a valid record.
    pub fn registered(&self) -> Result<Option<AccountRecord>> {
        self.get(ACCOUNT_KEY)
    }

    /// Log a student in against the stored record.
    ///
    /// # Errors
    /// `AccountNotFound` with no record, `InvalidCredentials` on mismatch.
    pub fn login_student(&self, email: &str, password: &str) -> Result<UserProfile> {
        let record = self.registered()?.ok_or(LearnZoneError::AccountNotFound)?;
        if record.email != email || record.password != password {
            debug!("Student login rejected");
            return Err(LearnZoneError::InvalidCredentials);
        }
        Ok(UserProfile {
            id: STUDENT_ID,
            name: record.full_name,
            role: UserRole::Student,
            plan: Some(record.plan),
            points: Some(STUDENT_POINTS),
            rank: Some(STUDENT_RANK),
        })
    }

    /// Teacher login is a mock: any credentials yield the demo teacher.
    #[must_use]
    pub fn login_teacher(&self) -> UserProfile {
        UserProfile {
            id: TEACHER_ID,
            name: "Teacher Ali".to_string(),
            role: UserRole::Teacher,
            plan: None,
            points: None,
            rank: None,
        }
    }

    /// Complete the mock payment for the registered student.
    ///
    /// The new account starts with zero points.
    ///
    /// # Errors
    /// `AccountNotFound` with no record, `IncompletePayment` if any card
    /// field is blank.
    pub fn complete_payment(&self, details: &PaymentDetails) -> Result<UserProfile> {
        let record = self.registered()?.ok_or(LearnZoneError::AccountNotFound)?;
        let missing = details.missing_fields();
        if !missing.is_empty() {
            return Err(LearnZoneError::IncompletePayment(missing.join(", ")));
        }
        info!(plan = %record.plan, price = record.plan.monthly_price(), "Payment accepted");
        Ok(UserProfile {
            id: STUDENT_ID,
            name: record.full_name,
            role: UserRole::Student,
            plan: Some(record.plan),
            points: Some(0),
            rank: Some(STUDENT_RANK),
        })
    }

    /// Remove the stored record. Returns `true` if one existed.
    ///
    /// # Errors
    /// Returns [`LearnZoneError::Database`] on SQLite failures.
    pub fn clear(&self) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![ACCOUNT_KEY])?;
        Ok(deleted > 0)
    }

    // ------------------------------------------------------------------
    // Key/value primitives
    // ------------------------------------------------------------------

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json =
            serde_json::to_vec(value).map_err(|e| LearnZoneError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, json, now],
        )?;
        debug!(key, bytes = json.len(), "Stored record");
        Ok(())
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let data: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|bytes| {
            serde_json::from_slice(&bytes).map_err(|e| LearnZoneError::Serialization(e.to_string()))
        })
        .transpose()
    }
}
