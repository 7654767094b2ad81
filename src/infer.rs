//! Column type inference: name-driven rules layered over content sampling.
//!
//! The engine owns the [`SqlType`] enum (the target MySQL column kinds), the
//! [`InferenceConfig`] value (keyword sets, the ordered rule table, datetime
//! patterns, and length thresholds), and [`TypeInference`], which resolves one
//! type per column through a fixed chain of predicate→decision steps:
//!
//! 1. Name-keyword numeric guard (`id`/`num`/`code` columns sampled for
//!    clean integers, with a 5% corruption tolerance)
//! 2. Explicit name-substring rule table (first key wins, table order)
//! 3. Full numeric parse of the column
//! 4. Datetime pattern matching
//! 5. String-length sizing fallback
//!
//! The chain is data, not nested conditionals: precedence stays auditable and
//! each step is testable on its own. All thresholds live in the config value
//! passed at construction, so parallel engines with different rule sets never
//! share state.

use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::{
    datetime::{self, DatetimePattern},
    identifier::strip_outer_quotes,
};

/// Largest value a 32-bit signed column can hold; above it, BIGINT.
pub const INT32_MAX: i64 = 2_147_483_647;

/// Target storage type for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    BigInteger,
    Double,
    Decimal { precision: u32, scale: u32 },
    VarChar(u32),
    Text,
    Date,
    Time,
    DateTime,
}

impl SqlType {
    pub fn decimal(precision: u32, scale: u32) -> Self {
        SqlType::Decimal { precision, scale }
    }

    /// Renders the MySQL column type token used in DDL.
    pub fn render(&self) -> String {
        match self {
            SqlType::Integer => "INT".to_string(),
            SqlType::BigInteger => "BIGINT".to_string(),
            SqlType::Double => "DOUBLE".to_string(),
            SqlType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            SqlType::VarChar(length) => format!("VARCHAR({length})"),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Time => "TIME".to_string(),
            SqlType::DateTime => "DATETIME".to_string(),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The engine's product: one column resolved to its target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredColumn {
    pub name: String,
    pub sql_type: SqlType,
}

/// Immutable knob set for one inference engine instance.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Name substrings that trigger the sampled integer guard.
    pub integer_keywords: Vec<String>,
    /// Upper bound on the deterministic sample drawn by the guard.
    pub integer_sample_size: usize,
    /// Fraction of sampled values that must be clean integers.
    pub integer_sample_threshold: f64,
    /// Ordered name-substring rules; first matching key wins outright.
    pub type_rules: Vec<(String, SqlType)>,
    /// Strict datetime patterns, tried in order.
    pub datetime_patterns: Vec<DatetimePattern>,
    /// Name substrings that force DATETIME in the final schema and select
    /// columns for datetime canonicalization during cleaning.
    pub datetime_name_keywords: Vec<String>,
    /// Sanitized names coerced to numeric during cleaning.
    pub money_columns: Vec<String>,
    /// Fixed length every VARCHAR column is flattened to in emitted DDL.
    pub varchar_length: u32,
    /// Global VARCHAR ceiling; also the conservative guard fallback length.
    pub max_varchar_length: u32,
    /// Rendered length at or above which a column is TEXT outright.
    pub text_threshold: u32,
    /// Ceiling applied to the grown safe length.
    pub safe_length_cap: u32,
    /// Safe lengths above this promote to TEXT.
    pub text_promotion_length: u32,
    /// Minimum VARCHAR length emitted by the sizing fallback.
    pub varchar_floor: u32,
    /// Slack multiplier applied to the observed maximum length.
    pub growth_factor: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            integer_keywords: vec!["id".into(), "num".into(), "code".into()],
            integer_sample_size: 200,
            integer_sample_threshold: 0.95,
            type_rules: vec![
                ("id".into(), SqlType::BigInteger),
                ("date".into(), SqlType::Date),
                ("time".into(), SqlType::Time),
                ("price".into(), SqlType::decimal(12, 4)),
                ("num".into(), SqlType::Integer),
                ("cost".into(), SqlType::decimal(12, 4)),
                ("hospital_id".into(), SqlType::VarChar(20)),
                ("prescription".into(), SqlType::VarChar(255)),
                ("bmi_convered_amount".into(), SqlType::VarChar(255)),
                ("p_type_pct".into(), SqlType::VarChar(255)),
                ("refund_flag_type".into(), SqlType::VarChar(255)),
                ("unit_price".into(), SqlType::VarChar(255)),
                ("self_pay_limit".into(), SqlType::VarChar(255)),
                ("p_type".into(), SqlType::VarChar(255)),
            ],
            datetime_patterns: datetime::default_patterns(),
            datetime_name_keywords: vec!["date".into(), "time".into(), "dt".into()],
            money_columns: vec!["cost".into(), "unit_price".into()],
            varchar_length: 255,
            max_varchar_length: 16383,
            text_threshold: 16383,
            safe_length_cap: 5000,
            text_promotion_length: 1000,
            varchar_floor: 45,
            growth_factor: 1.2,
        }
    }
}

impl InferenceConfig {
    pub fn datetime_named(&self, sanitized_name: &str) -> bool {
        self.datetime_name_keywords
            .iter()
            .any(|kw| sanitized_name.contains(kw.as_str()))
    }

    pub fn money_named(&self, sanitized_name: &str) -> bool {
        self.money_columns
            .iter()
            .any(|name| sanitized_name == name.as_str())
    }
}

fn strict_integer_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-+]?\d+$").expect("static integer pattern"))
}

/// Strips one quote layer and the `,`/`_` digit separators before the strict
/// integer check.
fn clean_integer_token(value: &str) -> String {
    strip_outer_quotes(value)
        .chars()
        .filter(|c| !matches!(c, ',' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_clean_integer(value: &str) -> bool {
    strict_integer_pattern().is_match(&clean_integer_token(value))
}

/// Evenly-spaced sample of up to `limit` cells. Deterministic on purpose:
/// the inference contract is a pure function of (samples, name).
fn spaced_sample<'a>(values: &'a [Option<String>], limit: usize) -> Vec<Option<&'a str>> {
    if limit == 0 || values.is_empty() {
        return Vec::new();
    }
    if values.len() <= limit {
        return values.iter().map(|v| v.as_deref()).collect();
    }
    let stride = values.len() / limit;
    values
        .iter()
        .step_by(stride.max(1))
        .take(limit)
        .map(|v| v.as_deref())
        .collect()
}

type Step = fn(&TypeInference, &[Option<String>], &str) -> Option<SqlType>;

/// Resolves one [`SqlType`] per column from its sampled values and sanitized
/// name. Construct once per import; cheap to share read-only.
#[derive(Debug, Clone)]
pub struct TypeInference {
    config: InferenceConfig,
}

impl TypeInference {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Decides the column type. Total: every column resolves to exactly one
    /// type, the sizing fallback catching whatever the earlier steps pass on.
    pub fn infer(&self, values: &[Option<String>], sanitized_name: &str) -> SqlType {
        const CHAIN: &[Step] = &[
            TypeInference::keyword_numeric_guard,
            TypeInference::name_rule_table,
            TypeInference::full_numeric_parse,
            TypeInference::datetime_pattern_match,
        ];
        for step in CHAIN {
            if let Some(resolved) = step(self, values, sanitized_name) {
                log::debug!("column '{sanitized_name}' resolved to {resolved}");
                return resolved;
            }
        }
        let fallback = self.string_sizing(values);
        log::debug!("column '{sanitized_name}' resolved to {fallback} (sizing fallback)");
        fallback
    }

    /// Step 1: columns whose name flags them as identifier-like get a sampled
    /// integer check with a small corruption tolerance. A column that passes
    /// the sample but fails the full parse is treated as opaque text at the
    /// maximum length, never at a computed one.
    fn keyword_numeric_guard(&self, values: &[Option<String>], name: &str) -> Option<SqlType> {
        let flagged = self
            .config
            .integer_keywords
            .iter()
            .any(|kw| name.contains(kw.as_str()));
        if !flagged {
            return None;
        }

        let sample = spaced_sample(values, self.config.integer_sample_size);
        let clean = sample
            .iter()
            .filter(|v| v.map(is_clean_integer).unwrap_or(false))
            .count();
        let threshold_met = !sample.is_empty()
            && clean as f64 >= sample.len() as f64 * self.config.integer_sample_threshold;

        if threshold_met
            && let Some(max_value) = parse_column_integers(values)
        {
            return Some(if max_value > INT32_MAX {
                SqlType::BigInteger
            } else {
                SqlType::Integer
            });
        }
        Some(SqlType::VarChar(self.config.max_varchar_length))
    }

    /// Step 2: domain rules keyed on name substrings. Table order is the
    /// precedence; the first key contained in the name wins outright.
    fn name_rule_table(&self, _values: &[Option<String>], name: &str) -> Option<SqlType> {
        self.config
            .type_rules
            .iter()
            .find(|(key, _)| name.contains(key.as_str()))
            .map(|(key, sql_type)| {
                log::debug!("column '{name}' matched type rule '{key}'");
                sql_type.clone()
            })
    }

    /// Step 3: the whole column parses as numeric, or the step passes.
    fn full_numeric_parse(&self, values: &[Option<String>], _name: &str) -> Option<SqlType> {
        let mut max_value = f64::MIN;
        let mut all_integral = true;
        let mut seen = 0usize;

        for value in values {
            let parsed: f64 = value.as_deref()?.trim().parse().ok()?;
            seen += 1;
            if parsed.fract() != 0.0 {
                all_integral = false;
            }
            if parsed > max_value {
                max_value = parsed;
            }
        }
        if seen == 0 {
            return None;
        }

        Some(if !all_integral {
            SqlType::Double
        } else if max_value > INT32_MAX as f64 {
            SqlType::BigInteger
        } else {
            SqlType::Integer
        })
    }

    /// Step 4: any configured datetime pattern plausibly parses the column.
    fn datetime_pattern_match(&self, values: &[Option<String>], _name: &str) -> Option<SqlType> {
        datetime::matches_any(values, &self.config.datetime_patterns).then_some(SqlType::DateTime)
    }

    /// Step 5: size a string column from the longest rendered value, with
    /// growth slack and a floor for future, slightly longer data.
    fn string_sizing(&self, values: &[Option<String>]) -> SqlType {
        let max_len = values
            .iter()
            .map(|v| v.as_deref().map(|s| s.chars().count()).unwrap_or(0))
            .max()
            .unwrap_or(0) as u32;

        if max_len >= self.config.text_threshold {
            return SqlType::Text;
        }
        let grown = (max_len as f64 * self.config.growth_factor) as u32;
        let safe_len = grown.min(self.config.safe_length_cap);
        if safe_len > self.config.text_promotion_length {
            return SqlType::Text;
        }
        SqlType::VarChar(safe_len.max(self.config.varchar_floor))
    }
}

/// Parses every cell as a separator-cleaned integer, yielding the maximum.
/// Any unparseable cell (or an empty column) fails the whole attempt.
fn parse_column_integers(values: &[Option<String>]) -> Option<i64> {
    let mut max_value: Option<i64> = None;
    for value in values {
        let parsed: i64 = clean_integer_token(value.as_deref()?).parse().ok()?;
        max_value = Some(max_value.map_or(parsed, |m| m.max(parsed)));
    }
    max_value
}
