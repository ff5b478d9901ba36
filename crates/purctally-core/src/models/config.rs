//! Configuration structures for the scanning pipeline.

use serde::{Deserialize, Serialize};

/// Default pattern used to discover the supplier name.
pub const DEFAULT_SUPPLIER_PATTERN: &str = r"(Sold\s*By:|Supplier|Vendor|From)[:\-]?\s*(.*)";

/// Default invoice number pattern.
pub const DEFAULT_INVNO_PATTERN: &str =
    r"(Invoice\s*Number|Invoice\s*No|Bill\s*No)[#:.\s]*([A-Za-z0-9\-/]+)";

/// Default invoice date pattern.
pub const DEFAULT_INVDT_PATTERN: &str = r"(Invoice\s*Date|Bill\s*Date)[:\-]?\s*([0-9/\-.\sA-Za-z]+)";

/// Default invoice amount pattern.
pub const DEFAULT_INVAMT_PATTERN: &str = r"(Grand\s*Total|Net\s*Amount|Total\s*Amount)[:\-]?\s*(.*)";

/// Main configuration, stored as `config.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Login credentials.
    pub auth: AuthConfig,

    /// Default extraction patterns.
    pub regex: RegexConfig,

    /// Path or name of the Tesseract binary.
    pub tesseract_cmd: String,

    /// Tally endpoint settings.
    pub tally: TallyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            regex: RegexConfig::default(),
            tesseract_cmd: "tesseract".to_string(),
            tally: TallyConfig::default(),
        }
    }
}

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl AuthConfig {
    /// Check a username/password pair against the configured credentials.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// The four default regular expressions.
///
/// `supplier` always runs with this value. The other three may be replaced
/// per supplier by entries in the pattern store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexConfig {
    /// Supplier pattern; the name is taken from capture group 2.
    pub supplier: String,

    /// Invoice number pattern.
    pub invno: String,

    /// Invoice date pattern.
    pub invdt: String,

    /// Invoice amount pattern.
    pub invamt: String,
}

impl Default for RegexConfig {
    fn default() -> Self {
        Self {
            supplier: DEFAULT_SUPPLIER_PATTERN.to_string(),
            invno: DEFAULT_INVNO_PATTERN.to_string(),
            invdt: DEFAULT_INVDT_PATTERN.to_string(),
            invamt: DEFAULT_INVAMT_PATTERN.to_string(),
        }
    }
}

/// Tally endpoint settings. The sync is mocked, so these are only recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub base_url: String,
    pub token: String,
}
