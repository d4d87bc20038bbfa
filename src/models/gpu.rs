use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a GPU. Serialized in kebab-case ("in-use", "loaned-out").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GpuStatus {
    #[default]
    Available,
    Missing,
    InUse,
    LoanedOut,
}

impl GpuStatus {
    pub const ALL: [GpuStatus; 4] = [
        GpuStatus::Available,
        GpuStatus::Missing,
        GpuStatus::InUse,
        GpuStatus::LoanedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GpuStatus::Available => "available",
            GpuStatus::Missing => "missing",
            GpuStatus::InUse => "in-use",
            GpuStatus::LoanedOut => "loaned-out",
        }
    }

    /// Wire names of every valid status, in declaration order.
    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(GpuStatus::as_str).collect()
    }
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for GpuStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Optional descriptive fields. Absent keys are omitted, never written as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    /// Keys this service does not model, kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One GPU inventory entry as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gpu {
    pub id: u64,
    pub vendor: String,
    pub name: String,
    pub generation: String,
    pub serial_number: String,
    pub owner: String,
    #[serde(default)]
    pub borrowee: Option<String>,
    pub status: GpuStatus,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

// ── Persisted document ───────────────────────────────────────────────────────

/// The `gpu_database` object: the record array plus any sibling keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuDatabase {
    pub gpus: Vec<Gpu>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Root of the data file. Read and written as a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuDocument {
    pub gpu_database: GpuDatabase,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl GpuDocument {
    pub fn gpus(&self) -> &[Gpu] {
        &self.gpu_database.gpus
    }

    pub fn find_by_serial(&self, serial_number: &str) -> Option<&Gpu> {
        self.gpus().iter().find(|g| g.serial_number == serial_number)
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Gpu> {
        self.gpu_database.gpus.iter_mut().find(|g| g.id == id)
    }

    /// `max(id) + 1`, or 1 for an empty collection. `None` once `u64::MAX` is taken.
    pub fn next_id(&self) -> Option<u64> {
        self.gpus().iter().map(|g| g.id).max().unwrap_or(0).checked_add(1)
    }
}

/// Leading `[+-]digits` of `s` after whitespace, read the way browsers'
/// `parseInt` does: "2022-03" gives "2022", "1.5" gives "1", "abc" gives "".
pub fn integer_prefix(s: &str) -> &str {
    let s = s.trim_start();
    let sign = usize::from(s.starts_with(['+', '-']));
    let end = s[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| sign + i);
    &s[..end]
}


// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of `POST /api/gpus`. Everything is optional here so that missing
/// required fields are reported together rather than as a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateGpu {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub generation: Option<String>,
    pub serial_number: Option<String>,
    pub owner: Option<String>,
    pub borrowee: Option<String>,
    pub status: Option<String>,
    pub memory: Option<String>,
    pub release_year: Option<ReleaseYear>,
    pub purchase_date: Option<String>,
}

/// Clients send the year either as a number (integer or float) or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReleaseYear {
    Number(i64),
    Float(f64),
    Text(String),
}

impl ReleaseYear {
    /// True when the value should be treated as "not provided" (0 or "").
    pub fn is_blank(&self) -> bool {
        match self {
            ReleaseYear::Number(n) => *n == 0,
            ReleaseYear::Float(f) => *f == 0.0,
            ReleaseYear::Text(s) => s.is_empty(),
        }
    }

    /// Coerces to an integer year. Floats are truncated; text is read up to
    /// the first non-digit, so "2022-03" gives 2022.
    pub fn to_year(&self) -> Option<i32> {
        match self {
            ReleaseYear::Number(n) => i32::try_from(*n).ok(),
            ReleaseYear::Float(f) => {
                let year = f.trunc();
                (f64::from(i32::MIN)..=f64::from(i32::MAX))
                    .contains(&year)
                    .then_some(year as i32)
            }
            ReleaseYear::Text(s) => integer_prefix(s).parse().ok(),
        }
    }
}

/// Body of `PATCH /api/gpus/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGpuStatus {
    pub status: Option<String>,
}
