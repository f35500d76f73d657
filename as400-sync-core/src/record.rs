//! Raw source rows, typed target records and the coercions between them.
//!
//! A [`RawRecord`] is whatever the source query returned: an ordered bag of named values.
//! A [`TargetRecord`] is a fixed struct per warehouse table, declared with
//! [`target_record!`](crate::target_record), which also generates the table's mapping
//! (source column -> target column -> [`FieldKind`]) and the conversion to bindable
//! [`FieldValue`]s.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::TransformOptions;
use crate::error::TransformError;

/// A single value as returned by the source system.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    Decimal(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Decimal(v)
    }
}

/// One extracted row: field names in query order with their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new(fields: Vec<(String, RawValue)>) -> Self {
        Self { fields }
    }

    /// Looks up a field by name, ignoring ASCII case (AS/400 reports upper-case names).
    ///
    /// `None` means the column is absent, which differs from a present `RawValue::Null`.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Field names in query order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A typed value ready to be bound into a target-store statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Text)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Int)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Decimal)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(v: Option<NaiveDate>) -> Self {
        v.map_or(FieldValue::Null, FieldValue::Date)
    }
}

/// How a mapped column is coerced. The lower-case names match the functions in [`coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Trimmed,
    Date,
    Int,
    IntRequired,
    Decimal,
    DecimalRequired,
}

impl FieldKind {
    /// Whether unparseable or missing values are replaced by the configured default.
    pub fn is_required(&self) -> bool {
        matches!(self, FieldKind::IntRequired | FieldKind::DecimalRequired)
    }
}

/// One entry of a record's mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: FieldKind,
}

/// A fixed, typed row of one warehouse table.
pub trait TargetRecord: Sized + Send {
    /// Target table name.
    const TABLE: &'static str;
    /// Query run against the source system. Incremental records bind two `YYYYMMDD` parameters.
    const SOURCE_QUERY: &'static str;
    /// Mapping table in target column order.
    const COLUMNS: &'static [ColumnSpec];

    fn from_raw(raw: &RawRecord, options: &TransformOptions) -> Result<Self, TransformError>;

    /// Values in [`COLUMNS`](TargetRecord::COLUMNS) order.
    fn into_values(self) -> Vec<FieldValue>;

    fn target_columns() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|c| c.target).collect()
    }
}

/// Value coercions, one per [`FieldKind`]. None of them fail: bad input becomes `None`
/// or, for the `*_required` kinds, the configured default.
pub mod coerce {
    use super::RawValue;
    use crate::config::TransformOptions;
    use chrono::NaiveDate;

    pub fn text(raw: &RawValue, _: &TransformOptions) -> Option<String> {
        match raw {
            RawValue::Null => None,
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Int(v) => Some(v.to_string()),
            RawValue::Decimal(v) => Some(v.to_string()),
        }
    }

    pub fn trimmed(raw: &RawValue, options: &TransformOptions) -> Option<String> {
        text(raw, options).map(|s| s.trim().to_string())
    }

    /// Parses the 8-digit `YYYYMMDD` form. `0`, blanks and impossible dates yield `None`.
    pub fn date(raw: &RawValue, _: &TransformOptions) -> Option<NaiveDate> {
        let digits = match raw {
            RawValue::Null => return None,
            RawValue::Int(v) => *v,
            RawValue::Decimal(v) if v.fract() == 0.0 && v.is_finite() => *v as i64,
            RawValue::Decimal(_) => return None,
            RawValue::Text(s) => {
                let s = s.trim();
                if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                s.parse().ok()?
            }
        };
        if !(10_000_101..=99_991_231).contains(&digits) {
            return None;
        }
        let year = i32::try_from(digits / 10_000).ok()?;
        let month = u32::try_from(digits / 100 % 100).ok()?;
        let day = u32::try_from(digits % 100).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn int(raw: &RawValue, _: &TransformOptions) -> Option<i64> {
        match raw {
            RawValue::Null => None,
            RawValue::Int(v) => Some(*v),
            RawValue::Decimal(v) => integral(*v),
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        }
    }

    pub fn int_required(raw: &RawValue, options: &TransformOptions) -> i64 {
        int(raw, options).unwrap_or(options.numeric_default)
    }

    pub fn decimal(raw: &RawValue, _: &TransformOptions) -> Option<f64> {
        match raw {
            RawValue::Null => None,
            RawValue::Int(v) => Some(*v as f64),
            RawValue::Decimal(v) => Some(*v).filter(|v| v.is_finite()),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn decimal_required(raw: &RawValue, options: &TransformOptions) -> f64 {
        decimal(raw, options).unwrap_or(options.numeric_default as f64)
    }

    fn integral(v: f64) -> Option<i64> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Some(v as i64)
        } else {
            None
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_type {
    (text) => { Option<String> };
    (trimmed) => { Option<String> };
    (date) => { Option<$crate::chrono::NaiveDate> };
    (int) => { Option<i64> };
    (int_required) => { i64 };
    (decimal) => { Option<f64> };
    (decimal_required) => { f64 };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_kind {
    (text) => { $crate::record::FieldKind::Text };
    (trimmed) => { $crate::record::FieldKind::Trimmed };
    (date) => { $crate::record::FieldKind::Date };
    (int) => { $crate::record::FieldKind::Int };
    (int_required) => { $crate::record::FieldKind::IntRequired };
    (decimal) => { $crate::record::FieldKind::Decimal };
    (decimal_required) => { $crate::record::FieldKind::DecimalRequired };
}

/// Declares a [`TargetRecord`]: the struct, its mapping table and both conversions.
///
/// ```ignore
/// target_record! {
///     /// Sales document lines.
///     pub struct VenditaRow {
///         table: "vendita",
///         query: VENDITE_QUERY,
///         fields: {
///             codice_articolo: int_required <= "DCOART",
///             data_documento: date <= "DATADOC",
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! target_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            table: $table:literal,
            query: $query:expr,
            fields: {
                $( $field:ident : $kind:ident <= $source:literal ),+ $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, $crate::serde::Serialize)]
        #[serde(crate = "as400_sync_core::serde")]
        pub struct $name {
            $( pub $field: $crate::__field_type!($kind), )+
        }

        impl $crate::record::TargetRecord for $name {
            const TABLE: &'static str = $table;
            const SOURCE_QUERY: &'static str = $query;
            const COLUMNS: &'static [$crate::record::ColumnSpec] = &[
                $(
                    $crate::record::ColumnSpec {
                        source: $source,
                        target: stringify!($field),
                        kind: $crate::__field_kind!($kind),
                    },
                )+
            ];

            fn from_raw(
                raw: &$crate::record::RawRecord,
                options: &$crate::config::TransformOptions,
            ) -> Result<Self, $crate::error::TransformError> {
                Ok(Self {
                    $(
                        $field: {
                            let value = raw.get($source).ok_or(
                                $crate::error::TransformError::MissingColumn {
                                    column: $source,
                                    row: 0,
                                },
                            )?;
                            $crate::record::coerce::$kind(value, options)
                        },
                    )+
                })
            }

            fn into_values(self) -> Vec<$crate::record::FieldValue> {
                vec![ $( $crate::record::FieldValue::from(self.$field), )+ ]
            }
        }
    };
}
