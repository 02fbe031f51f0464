//! Managed entity kinds, their field schemas and boundary validation
//!
//! Every admin screen manages one [`EntityKind`]. Records travel as a
//! [`ManagedEntity`] whose `fields` are checked against the kind's static schema
//! before they are submitted to the backing store, and again by the API server
//! before they are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use crate::{Error, Result};

/// Lead pipeline states, in workflow order
pub const LEAD_STATUSES: &[&str] = &["new", "contacted", "qualified", "lost", "converted"];

/// Publication states of a portfolio item
pub const PORTFOLIO_STATUSES: &[&str] = &["draft", "published", "archived"];

/// Roles a back-office user may hold
pub const USER_ROLES: &[&str] = &["user", "client", "employee", "admin", "super_admin"];

/// Field names owned by the backing store and never accepted in a field mapping
pub const RESERVED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// The entity kinds managed from the admin area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Contact-form and sales leads
    Lead,
    /// CMS pages
    Page,
    /// Portfolio case studies
    PortfolioItem,
    /// Back-office users
    User,
    /// Per-page SEO metadata
    SeoSetting,
}

impl EntityKind {
    /// All kinds, in navigation order
    pub const ALL: [Self; 5] = [
        Self::Lead,
        Self::Page,
        Self::PortfolioItem,
        Self::User,
        Self::SeoSetting,
    ];

    /// Backing-store collection (table) name
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Lead => "leads",
            Self::Page => "pages",
            Self::PortfolioItem => "portfolio_items",
            Self::User => "users",
            Self::SeoSetting => "seo_settings",
        }
    }

    /// URL segment used by both the admin UI and the admin API
    #[must_use]
    pub const fn route_segment(self) -> &'static str {
        match self {
            Self::Lead => "leads",
            Self::Page => "pages",
            Self::PortfolioItem => "portfolio",
            Self::User => "users",
            Self::SeoSetting => "seo",
        }
    }

    /// Resolve a kind from its URL segment
    #[must_use]
    pub fn from_route_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.route_segment() == segment)
    }

    /// Human-readable plural name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lead => "Leads",
            Self::Page => "Pages",
            Self::PortfolioItem => "Portfolio",
            Self::User => "Users",
            Self::SeoSetting => "SEO Settings",
        }
    }

    /// Field schema, in display order; the first field is the record's title
    #[must_use]
    pub const fn schema(self) -> &'static [FieldSpec] {
        match self {
            Self::Lead => LEAD_SCHEMA,
            Self::Page => PAGE_SCHEMA,
            Self::PortfolioItem => PORTFOLIO_SCHEMA,
            Self::User => USER_SCHEMA,
            Self::SeoSetting => SEO_SCHEMA,
        }
    }

    /// Look up one field of the schema
    #[must_use]
    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.schema().iter().find(|spec| spec.name == name)
    }

    /// Name of the choice field that drives status filtering, if the kind has one
    #[must_use]
    pub const fn status_field(self) -> Option<&'static str> {
        match self {
            Self::Lead | Self::PortfolioItem => Some("status"),
            Self::User => Some("role"),
            Self::Page | Self::SeoSetting => None,
        }
    }

    /// Validate a field mapping against this kind's schema
    ///
    /// Only schema conformance is checked here: unknown or reserved names, value
    /// types, choice membership and required-field presence. Business rules are
    /// left to the backing store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(self, fields: &Fields, mode: ValidationMode) -> Result<()> {
        for name in fields.keys() {
            if RESERVED_FIELDS.contains(&name.as_str()) {
                return Err(Error::validation(name, "is managed by the backing store"));
            }
            if self.field(name).is_none() {
                return Err(Error::validation(
                    name,
                    format!("is not a field of {}", self.label()),
                ));
            }
        }

        for spec in self.schema() {
            match fields.get(spec.name) {
                Some(value) => spec.check(value)?,
                None if spec.required && mode == ValidationMode::Create => {
                    return Err(Error::validation(spec.name, "is required"));
                }
                None => {}
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// Whether a field mapping describes a new record or a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every required field must be present
    Create,
    /// Absent fields are left unchanged
    Update,
}

/// Expected type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// Email address (text)
    Email,
    /// Absolute or site-relative URL (text)
    Url,
    /// True/false flag
    Boolean,
    /// Whole number
    Integer,
    /// List of short strings
    Tags,
    /// One of a fixed set of strings
    Choice(&'static [&'static str]),
}

impl FieldType {
    /// Short name used in validation messages
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Text | Self::LongText | Self::Email | Self::Url => "text",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Tags => "a list of strings",
            Self::Choice(_) => "one of the allowed values",
        }
    }
}

/// One entry of an entity schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as stored
    pub name: &'static str,
    /// Label shown in forms and table headers
    pub label: &'static str,
    /// Expected value type
    pub field_type: FieldType,
    /// Must be present and non-empty on create
    pub required: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            label,
            field_type,
            required: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn check(&self, value: &FieldValue) -> Result<()> {
        if value.is_blank() {
            return if self.required {
                Err(Error::validation(self.name, "is required"))
            } else {
                Ok(())
            };
        }

        let matches = match (self.field_type, value) {
            (FieldType::Email, FieldValue::Text(text)) => {
                if !text.trim().validate_email() {
                    return Err(Error::validation(self.name, "must be a valid email"));
                }
                true
            }
            (FieldType::Url, FieldValue::Text(text)) => {
                if !is_url(text.trim()) {
                    return Err(Error::validation(self.name, "must be a valid URL"));
                }
                true
            }
            (FieldType::Text | FieldType::LongText, FieldValue::Text(_))
            | (FieldType::Boolean, FieldValue::Bool(_))
            | (FieldType::Integer, FieldValue::Integer(_))
            | (FieldType::Tags, FieldValue::List(_)) => true,
            (FieldType::Choice(options), FieldValue::Text(text)) => {
                if !options.contains(&text.as_str()) {
                    return Err(Error::validation(
                        self.name,
                        format!("must be one of: {}", options.join(", ")),
                    ));
                }
                true
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(Error::validation(
                self.name,
                format!("must be {}", self.field_type.describe()),
            ))
        }
    }
}

/// Absolute URL, or a path on this site
fn is_url(text: &str) -> bool {
    if let Some(rest) = text.strip_prefix('/') {
        return !rest.starts_with('/') && !text.chars().any(char::is_whitespace);
    }
    text.validate_url()
}

const LEAD_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("name", "Name", FieldType::Text).required(),
    FieldSpec::new("email", "Email", FieldType::Email).required(),
    FieldSpec::new("subject", "Subject", FieldType::Text).required(),
    FieldSpec::new("message", "Message", FieldType::LongText).required(),
    FieldSpec::new("company", "Company", FieldType::Text),
    FieldSpec::new("phone", "Phone", FieldType::Text),
    FieldSpec::new("source", "Source", FieldType::Text),
    FieldSpec::new("status", "Status", FieldType::Choice(LEAD_STATUSES)),
    FieldSpec::new("lead_score", "Score", FieldType::Integer),
    FieldSpec::new("ip_address", "IP address", FieldType::Text),
    FieldSpec::new("user_agent", "User agent", FieldType::Text),
];

const PAGE_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("page_name", "Page name", FieldType::Text).required(),
    FieldSpec::new("slug", "Slug", FieldType::Text),
    FieldSpec::new("content", "Content", FieldType::LongText),
    FieldSpec::new("is_published", "Published", FieldType::Boolean),
    FieldSpec::new("version", "Version", FieldType::Integer),
];

const PORTFOLIO_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldType::Text).required(),
    FieldSpec::new("description", "Description", FieldType::LongText).required(),
    FieldSpec::new("category", "Category", FieldType::Text).required(),
    FieldSpec::new("client", "Client", FieldType::Text),
    FieldSpec::new("date", "Date", FieldType::Text),
    FieldSpec::new("tags", "Tags", FieldType::Tags),
    FieldSpec::new("technologies", "Technologies", FieldType::Tags),
    FieldSpec::new("featured", "Featured", FieldType::Boolean),
    FieldSpec::new("status", "Status", FieldType::Choice(PORTFOLIO_STATUSES)),
    FieldSpec::new("image", "Image URL", FieldType::Url),
];

const USER_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("email", "Email", FieldType::Email).required(),
    FieldSpec::new("full_name", "Full name", FieldType::Text),
    FieldSpec::new("role", "Role", FieldType::Choice(USER_ROLES)).required(),
];

const SEO_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("page_url", "Page URL", FieldType::Url).required(),
    FieldSpec::new("title", "Title", FieldType::Text).required(),
    FieldSpec::new("meta_description", "Meta description", FieldType::LongText),
    FieldSpec::new("keywords", "Keywords", FieldType::Tags),
    FieldSpec::new("og_image", "Open Graph image", FieldType::Url),
    FieldSpec::new("canonical_url", "Canonical URL", FieldType::Url),
    FieldSpec::new("noindex", "Hide from search engines", FieldType::Boolean),
];

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit absence; clears an optional field on update
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Text value
    Text(String),
    /// List of strings
    List(Vec<String>),
}

impl FieldValue {
    /// Whether the value counts as "not provided" for required-field checks
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Bool(_) | Self::Integer(_) | Self::List(_) => false,
        }
    }

    /// Borrow the text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the value for a table cell or CSV column
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(flag) => (if *flag { "Yes" } else { "No" }).to_string(),
            Self::Integer(number) => number.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Field name to value mapping of one record
pub type Fields = BTreeMap<String, FieldValue>;

/// Build a [`Fields`] mapping from `name => value` pairs
#[macro_export]
macro_rules! fields {
    () => {
        $crate::entity::Fields::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::entity::Fields::new();
        $(fields.insert($name.to_string(), $crate::entity::FieldValue::from($value));)+
        fields
    }};
}

/// A record owned by the backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedEntity {
    /// Identifier assigned by the backing store
    pub id: Uuid,
    /// Kind of record
    pub kind: EntityKind,
    /// Attribute values
    pub fields: Fields,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl ManagedEntity {
    /// Look up one field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text content of one field
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_text)
    }

    /// Title shown for the record: the first schema field, falling back to the id
    #[must_use]
    pub fn title(&self) -> String {
        self.kind
            .schema()
            .first()
            .and_then(|spec| self.field(spec.name))
            .map(FieldValue::display)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Apply a partial field mapping; `Null` values remove the field
    pub fn merge(&mut self, changes: &Fields) {
        for (name, value) in changes {
            if *value == FieldValue::Null {
                self.fields.remove(name);
            } else {
                self.fields.insert(name.clone(), value.clone());
            }
        }
    }

    /// Case-insensitive match of `term` against the record's text and list fields
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.fields.values().any(|value| match value {
            FieldValue::Text(text) => text.to_lowercase().contains(&needle),
            FieldValue::List(items) => items
                .iter()
                .any(|item| item.to_lowercase().contains(&needle)),
            _ => false,
        })
    }
}
