//! Shared API request/response types
//!
//! Mirrors the analysis server's contract:
//!
//! | Operation | Method & Path |
//! |---|---|
//! | Upload | `POST /upload/{layout}` |
//! | Analyze | `POST /{action}/{upload_id}` |
//! | Download | `GET /download_{format}/{kind}_{upload_id}` |
//!
//! Count tables arrive as JSON objects keyed by sign or word-form label.
//! They are decoded into [`LabelMap`], which keeps the server's key order
//! and rejects a label that appears twice in one response.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Error, Result};

// ========================================
// Enumerated choices
// ========================================

/// Tablet layout the server uses when extracting the uploaded document
///
/// Exactly one is selected at upload time; [`LayoutChoice::Lines`] is the
/// fallback when nothing was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutChoice {
    /// Plain numbered lines
    #[default]
    Lines,
    /// Obverse and reverse sections
    ObverseReverse,
    /// Column-divided tablet
    Columns,
}

impl LayoutChoice {
    /// All layouts, in display order
    pub const ALL: [LayoutChoice; 3] = [
        LayoutChoice::Lines,
        LayoutChoice::ObverseReverse,
        LayoutChoice::Columns,
    ];

    /// Path segment used in `POST /upload/{layout}`
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutChoice::Lines => "lines",
            LayoutChoice::ObverseReverse => "obverse_reverse",
            LayoutChoice::Columns => "columns",
        }
    }
}

impl fmt::Display for LayoutChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '/'], "_").as_str() {
            "lines" => Ok(LayoutChoice::Lines),
            "obverse_reverse" => Ok(LayoutChoice::ObverseReverse),
            "columns" => Ok(LayoutChoice::Columns),
            other => Err(Error::InvalidInput(format!("unknown layout: {}", other))),
        }
    }
}

/// Server-side analysis the client can request for an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Sign counts by preservation state
    Signs,
    /// Attested word forms by preservation state
    Words,
    /// Attestation counts per glossary form
    Glossary,
    /// ORACC-formatted rendering of the transliteration
    Oracc,
}

impl AnalysisKind {
    /// All kinds, in display order
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Signs,
        AnalysisKind::Words,
        AnalysisKind::Glossary,
        AnalysisKind::Oracc,
    ];

    /// Token used in download paths and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Signs => "signs",
            AnalysisKind::Words => "words",
            AnalysisKind::Glossary => "glossary",
            AnalysisKind::Oracc => "oracc",
        }
    }

    /// Server route name for `POST /{action}/{upload_id}`
    pub fn action_path(&self) -> &'static str {
        match self {
            AnalysisKind::Signs => "analyzeSignsAction",
            AnalysisKind::Words => "analyzeWordsAction",
            AnalysisKind::Glossary => "analyzeGlossaryAction",
            AnalysisKind::Oracc => "analyzeORACCAction",
        }
    }

    /// Whether results of this kind are count tables
    pub fn is_tabular(&self) -> bool {
        !matches!(self, AnalysisKind::Oracc)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signs" => Ok(AnalysisKind::Signs),
            "words" => Ok(AnalysisKind::Words),
            "glossary" => Ok(AnalysisKind::Glossary),
            "oracc" => Ok(AnalysisKind::Oracc),
            other => Err(Error::InvalidInput(format!("unknown analysis kind: {}", other))),
        }
    }
}

/// Export format served by `GET /download_{format}/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Atf,
}

impl ExportFormat {
    /// All formats, in display order
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Atf];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Atf => "atf",
        }
    }

    /// Whether this export exists for results of `kind`
    ///
    /// ATF follows an Oracc analysis; CSV and XLSX follow the three count
    /// tables. The two groups never overlap.
    pub fn enabled_for(&self, kind: AnalysisKind) -> bool {
        match self {
            ExportFormat::Atf => kind == AnalysisKind::Oracc,
            ExportFormat::Csv | ExportFormat::Xlsx => kind.is_tabular(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "atf" => Ok(ExportFormat::Atf),
            other => Err(Error::InvalidInput(format!("unknown export format: {}", other))),
        }
    }
}

// ========================================
// Upload
// ========================================

/// Success body of `POST /upload/{layout}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadResponse {
    /// Opaque session token; propagated byte-for-byte into later paths
    pub upload_id: String,

    /// Sanitized file name as stored by the server
    pub filename: String,

    /// Human-readable confirmation, e.g. "File uploaded successfully"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body the server attaches to non-2xx responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// ========================================
// Count tables
// ========================================

/// Per-sign counts from `analyzeSignsAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SignCounts {
    pub preserved: u64,
    pub partial: u64,
    pub reconstructed: u64,
    #[serde(rename = "in <>")]
    pub in_angle_brackets: u64,
    #[serde(rename = "in ()")]
    pub in_parentheses: u64,
    #[serde(rename = "in <<>>")]
    pub in_double_angle_brackets: u64,
}

impl SignCounts {
    /// Column headers, in wire field order
    pub const HEADERS: [&'static str; 6] = [
        "preserved",
        "partial",
        "reconstructed",
        "in <>",
        "in ()",
        "in <<>>",
    ];

    pub fn values(&self) -> [u64; 6] {
        [
            self.preserved,
            self.partial,
            self.reconstructed,
            self.in_angle_brackets,
            self.in_parentheses,
            self.in_double_angle_brackets,
        ]
    }
}

/// Per-form counts from `analyzeWordsAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct WordCounts {
    pub preserved: u64,
    #[serde(rename = "partially preserved")]
    pub partially_preserved: u64,
    pub reconstructed: u64,
}

impl WordCounts {
    pub const HEADERS: [&'static str; 3] = ["preserved", "partially preserved", "reconstructed"];

    pub fn values(&self) -> [u64; 3] {
        [self.preserved, self.partially_preserved, self.reconstructed]
    }
}

/// Per-form attestation count from `analyzeGlossaryAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct GlossaryCounts {
    pub attestation: u64,
}

impl GlossaryCounts {
    pub const HEADERS: [&'static str; 1] = ["attestation"];

    pub fn values(&self) -> [u64; 1] {
        [self.attestation]
    }
}

/// Ordered label -> record table
///
/// Iteration yields entries in the order the server wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelMap<R>(IndexMap<String, R>);

impl<R> LabelMap<R> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&R> {
        self.0.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.0.iter().map(|(label, record)| (label.as_str(), record))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<R> Default for LabelMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<(String, R)> for LabelMap<R> {
    fn from_iter<I: IntoIterator<Item = (String, R)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de, R> Deserialize<'de> for LabelMap<R>
where
    R: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelMapVisitor<R>(PhantomData<R>);

        impl<'de, R> Visitor<'de> for LabelMapVisitor<R>
        where
            R: Deserialize<'de>,
        {
            type Value = LabelMap<R>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from label to count record")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, record)) = access.next_entry::<String, R>()? {
                    if entries.contains_key(&label) {
                        return Err(de::Error::custom(format!("duplicate label `{}`", label)));
                    }
                    entries.insert(label, record);
                }
                Ok(LabelMap(entries))
            }
        }

        deserializer.deserialize_map(LabelMapVisitor(PhantomData))
    }
}

/// Success body shared by the three count-table analyses
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TableResponse<R> {
    pub analysis: LabelMap<R>,

    /// Any-shaped diagnostics (string, list, null)
    #[serde(default)]
    pub syntax_errors: Value,
}

// ========================================
// ORACC
// ========================================

/// Request body of `analyzeORACCAction`
///
/// The server expects the literal strings `"True"` / `"False"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OraccRequest {
    #[serde(rename = "obverseReverse", serialize_with = "serialize_flag")]
    #[serde(deserialize_with = "deserialize_flag")]
    pub obverse_reverse: bool,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub columns: bool,
}

fn serialize_flag<S>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.as_str() {
        "True" => Ok(true),
        "False" => Ok(false),
        other => Err(de::Error::custom(format!("expected \"True\" or \"False\", got `{}`", other))),
    }
}

/// Success body of `analyzeORACCAction`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OraccResponse {
    /// Pre-rendered markup; displayed as-is
    pub as_html_data: String,

    /// Plain ATF text the markup was built from, when the server sends it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,

    #[serde(default)]
    pub syntax_errors: Value,
}

// ========================================
// Diagnostics
// ========================================

/// Normalized `syntax_errors` payload, one display line per entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagnostics(Vec<String>);

impl Diagnostics {
    pub fn new(lines: Vec<String>) -> Self {
        Self(lines)
    }

    /// Flatten an any-shaped diagnostics value
    ///
    /// A string is one line, a list is one line per element, an object is
    /// one `key: value` line per entry. Null and blank strings yield nothing.
    pub fn from_value(value: &Value) -> Self {
        let mut lines = Vec::new();
        match value {
            Value::Null => {}
            Value::String(s) => push_line(&mut lines, s),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => push_line(&mut lines, s),
                        Value::Null => {}
                        other => lines.push(other.to_string()),
                    }
                }
            }
            Value::Object(entries) => {
                for (key, item) in entries {
                    match item {
                        Value::String(s) => lines.push(format!("{}: {}", key, s)),
                        other => lines.push(format!("{}: {}", key, other)),
                    }
                }
            }
            other => lines.push(other.to_string()),
        }
        Self(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn push_line(lines: &mut Vec<String>, s: &str) {
    let trimmed = s.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}
