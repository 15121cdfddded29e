use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A scalar decoded from a partition stream.
///
/// Signed, unsigned and floating-point numbers stay in separate variants so
/// nothing is lost at decode time; [`Value::compare`] still orders them
/// numerically against each other.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null; compares to nothing, including itself.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer that does not fit in `i64`.
    UInt(u64),
    /// IEEE-754 double.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Calendar date reconstructed from a `__date__` tag.
    Date(NaiveDate),
    /// Wall-clock time reconstructed from a `__time__` tag.
    Time(NaiveTime),
    /// Date and time reconstructed from a `__datetime__` tag.
    DateTime(NaiveDateTime),
    /// Nested array. Rows are arrays at the top level; a `List` inside a row
    /// is kept structurally but never compares.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "array",
        }
    }

    /// Borrow the text payload when this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values, returning an ordering only when the pair is
    /// comparable: numeric across `Int`/`UInt`/`Float`, lexicographic for
    /// strings and binary, chronological for the temporal variants. Any
    /// other pairing, and anything involving `Null` or `List`, yields
    /// `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;

        match (self, other) {
            (Boolean(l), Boolean(r)) => Some(l.cmp(r)),
            (Int(_) | UInt(_) | Float(_), Int(_) | UInt(_) | Float(_)) => {
                numeric_cmp(self, other)
            }
            (String(l), String(r)) => Some(l.cmp(r)),
            (Binary(l), Binary(r)) => Some(l.cmp(r)),
            (Date(l), Date(r)) => Some(l.cmp(r)),
            (Time(l), Time(r)) => Some(l.cmp(r)),
            (DateTime(l), DateTime(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    use Value::*;

    match (left, right) {
        (Int(l), Int(r)) => Some(l.cmp(r)),
        (UInt(l), UInt(r)) => Some(l.cmp(r)),
        (Int(l), UInt(r)) => Some(cmp_signed_unsigned(*l, *r)),
        (UInt(l), Int(r)) => Some(cmp_signed_unsigned(*r, *l).reverse()),
        (Float(l), Float(r)) => l.partial_cmp(r),
        (Int(l), Float(r)) => (*l as f64).partial_cmp(r),
        (Float(l), Int(r)) => l.partial_cmp(&(*r as f64)),
        (UInt(l), Float(r)) => (*l as f64).partial_cmp(r),
        (Float(l), UInt(r)) => l.partial_cmp(&(*r as f64)),
        _ => None,
    }
}

fn cmp_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    if signed < 0 {
        Ordering::Less
    } else {
        (signed as u64).cmp(&unsigned)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use chrono::NaiveDate;

    use super::Value;

    #[test]
    fn numeric_ordering_crosses_widths() {
        assert_eq!(
            Value::Int(3).compare(&Value::Int(7)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Int(3).compare(&Value::Float(3.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::UInt(u64::MAX).compare(&Value::Int(-1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Float(2.5).compare(&Value::Int(2)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn strings_order_lexicographically() {
        assert_eq!(
            Value::from("10").compare(&Value::from("9")),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("3").compare(&Value::from("3")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn dates_order_chronologically() {
        let earlier = NaiveDate::from_ymd_opt(2015, 8, 30).unwrap();
        let later = NaiveDate::from_ymd_opt(2015, 9, 1).unwrap();
        assert_eq!(
            Value::Date(earlier).compare(&Value::Date(later)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn cross_type_and_null_never_compare() {
        assert_eq!(Value::from("3").compare(&Value::Int(3)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_eq!(Value::Null.compare(&Value::Int(0)), None);
        assert_eq!(
            Value::List(vec![]).compare(&Value::List(vec![])),
            None
        );
    }
}
