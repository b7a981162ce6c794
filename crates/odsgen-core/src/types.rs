use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declared BigQuery-style type of an ODS column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Int64,
    Float64,
    String,
    Date,
    Timestamp,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role used to synthesize the raw value of a column.
///
/// Derived generators (`date_offset`, `date_after_months`, `ratio`,
/// `reference`) read the raw values of other columns of the same row and
/// are evaluated after them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldGenerator {
    /// The row identifier itself.
    RowId,
    FirstName,
    LastName,
    FullName,
    Email,
    Company,
    PostCode,
    PhoneNumber,
    /// Uniform pick from a named value list.
    Choice { list: String },
    IntRange { min: i64, max: i64 },
    FloatRange { min: f64, max: f64 },
    /// Inclusive date range, `YYYY-MM-DD`.
    DateRange { min: String, max: String },
    /// `from` plus a random number of days in `[min_days, max_days]`.
    DateOffset {
        from: String,
        min_days: i64,
        max_days: i64,
    },
    /// `from` plus `months` (an integer column) times thirty days.
    DateAfterMonths { from: String, months: String },
    /// `numerator / denominator`, both numeric columns.
    Ratio {
        numerator: String,
        denominator: String,
    },
    /// `PREFIX-<year of year_from>-<row id padded to width>`.
    Reference {
        prefix: String,
        year_from: String,
        width: usize,
    },
    /// Free text of at most `max_chars` characters.
    Lorem { max_chars: usize },
    Uuid,
    /// Session clock timestamp.
    Now,
}

impl FieldGenerator {
    /// Stable identifier used in logs and reports.
    pub fn id(&self) -> &'static str {
        match self {
            Self::RowId => "row_id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Company => "company",
            Self::PostCode => "post_code",
            Self::PhoneNumber => "phone_number",
            Self::Choice { .. } => "choice",
            Self::IntRange { .. } => "int_range",
            Self::FloatRange { .. } => "float_range",
            Self::DateRange { .. } => "date_range",
            Self::DateOffset { .. } => "date_offset",
            Self::DateAfterMonths { .. } => "date_after_months",
            Self::Ratio { .. } => "ratio",
            Self::Reference { .. } => "reference",
            Self::Lorem { .. } => "lorem",
            Self::Uuid => "uuid",
            Self::Now => "now",
        }
    }

    /// Columns whose raw values this generator reads.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::DateOffset { from, .. } => vec![from.as_str()],
            Self::DateAfterMonths { from, months } => vec![from.as_str(), months.as_str()],
            Self::Ratio {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
            Self::Reference { year_from, .. } => vec![year_from.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn is_derived(&self) -> bool {
        !self.inputs().is_empty()
    }
}
