//! Pushed-down predicate compilation and row matching.
//!
//! The host hands over an unordered set of [`Qual`]s with AND semantics.
//! [`CompiledPredicates::compile`] resolves each one exactly once, before
//! row iteration starts: operator symbols against the fixed table, field
//! names against the positional column mapping, pattern literals into
//! anchored regexes. Per-row evaluation is then a short-circuit AND with no
//! lookups left in it.

use std::{cmp::Ordering, fmt};

use regex::Regex;

use crate::{error::Error, logging::packscan_log, scan::Row, value::Value};

/// One filter condition pushed down by the host engine.
#[derive(Debug, Clone)]
pub struct Qual {
    /// Column the condition applies to.
    pub field_name: String,
    /// Operator symbol, e.g. `=` or `~~`. Symbols outside the fixed table
    /// are tolerated: the condition is reported and skipped, never enforced.
    pub operator: String,
    /// Literal right-hand operand.
    pub value: Value,
}

impl Qual {
    /// Build a condition from a field name, operator symbol and literal.
    pub fn new(
        field_name: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Operator understood by the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Equals (`=`).
    Equal,
    /// Not equals (`<>`).
    NotEqual,
    /// Less than (`<`).
    LessThan,
    /// Less than or equal to (`<=`).
    LessThanOrEqual,
    /// Greater than (`>`).
    GreaterThan,
    /// Greater than or equal to (`>=`).
    GreaterThanOrEqual,
    /// SQL `LIKE` (`~~`), case-sensitive.
    Like,
    /// SQL `ILIKE` (`~~*`), case-insensitive.
    ILike,
    /// Negated `LIKE` (`!~~`).
    NotLike,
    /// Negated `ILIKE` (`!~~*`).
    NotILike,
}

impl Operator {
    /// Resolve a symbol against the fixed operator table.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => Operator::Equal,
            "<>" => Operator::NotEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanOrEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "~~" => Operator::Like,
            "~~*" => Operator::ILike,
            "!~~" => Operator::NotLike,
            "!~~*" => Operator::NotILike,
            _ => return None,
        })
    }

    /// The symbol this operator was resolved from.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Like => "~~",
            Operator::ILike => "~~*",
            Operator::NotLike => "!~~",
            Operator::NotILike => "!~~*",
        }
    }

    fn is_pattern(self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::ILike | Operator::NotLike | Operator::NotILike
        )
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
            // Pattern operators are compiled to matchers, never routed here.
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Translate a SQL LIKE pattern into an anchored regex: `%` matches any run
/// of characters, `_` exactly one, everything else literally. The `\z`
/// anchor requires full-string consumption; a prefix match is not enough.
fn translate_like(pattern: &str) -> String {
    let escaped = regex::escape(pattern);
    let translated = escaped.replace('%', ".*").replace('_', ".");
    format!(r"\A{translated}\z")
}

fn compile_pattern(op: Operator, literal: &Value) -> Result<CompiledOp, Error> {
    let Some(pattern) = literal.as_str() else {
        return Err(Error::NonStringPattern(op.symbol()));
    };
    let lowercase = matches!(op, Operator::ILike | Operator::NotILike);
    let negated = matches!(op, Operator::NotLike | Operator::NotILike);

    let source = if lowercase {
        translate_like(&pattern.to_lowercase())
    } else {
        translate_like(pattern)
    };
    let regex = Regex::new(&source).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })?;

    Ok(CompiledOp::Pattern {
        regex,
        lowercase,
        negated,
    })
}

#[derive(Debug)]
enum CompiledOp {
    Compare(Operator),
    Pattern {
        regex: Regex,
        lowercase: bool,
        negated: bool,
    },
}

#[derive(Debug)]
struct CompiledPredicate {
    column: usize,
    op: CompiledOp,
    literal: Value,
}

impl CompiledPredicate {
    fn matches(&self, row: &Row) -> bool {
        let Some(value) = row.get(self.column) else {
            return false;
        };
        match &self.op {
            CompiledOp::Compare(op) => match value.compare(&self.literal) {
                Some(ordering) => op.accepts(ordering),
                None => false,
            },
            CompiledOp::Pattern {
                regex,
                lowercase,
                negated,
            } => {
                let matched = match value.as_str() {
                    Some(text) if *lowercase => regex.is_match(&text.to_lowercase()),
                    Some(text) => regex.is_match(text),
                    None => false,
                };
                matched != *negated
            }
        }
    }
}

/// A predicate set resolved against a column mapping, ready for per-row
/// evaluation.
#[derive(Debug)]
pub struct CompiledPredicates {
    predicates: Vec<CompiledPredicate>,
}

impl CompiledPredicates {
    /// Resolve `quals` against the positional column mapping.
    ///
    /// An operator symbol outside the fixed table is reported through the
    /// logging channel and the condition is dropped: the row set may be
    /// under-filtered, never over-filtered, and the host re-checks rows
    /// anyway. A field name absent from the mapping is a contract violation
    /// and fails compilation.
    pub fn compile(quals: &[Qual], columns: &[String]) -> Result<Self, Error> {
        let mut predicates = Vec::with_capacity(quals.len());
        for qual in quals {
            let Some(operator) = Operator::from_symbol(&qual.operator) else {
                packscan_log!(
                    log::Level::Warn,
                    "unknown_operator",
                    "operator={} field={} condition skipped, rows will be returned",
                    qual.operator,
                    qual.field_name,
                );
                continue;
            };
            let column = columns
                .iter()
                .position(|name| name == &qual.field_name)
                .ok_or_else(|| Error::UnknownField(qual.field_name.clone()))?;
            let op = if operator.is_pattern() {
                compile_pattern(operator, &qual.value)?
            } else {
                CompiledOp::Compare(operator)
            };
            predicates.push(CompiledPredicate {
                column,
                op,
                literal: qual.value.clone(),
            });
        }
        Ok(Self { predicates })
    }

    /// True when `row` satisfies every compiled condition. Evaluation
    /// short-circuits on the first failing condition; an empty set matches
    /// everything.
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(row))
    }

    /// Number of conditions that will actually be enforced.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True when no condition survived compilation.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
