//! Declarative configuration schemas.
//!
//! A [`Schema`] is an ordered list of named sections, each described by a
//! [`SectionSchema`]. Validating a [`RawConfig`] against a schema is a pure
//! pass: it either yields typed [`Section`] values for every declared section
//! or a [`ValidationErrors`] list naming each offending section and key.
//!
//! Every field is validated, including defaults, and failures never stop the
//! pass early: all problems are reported at once, in declaration order.

use std::collections::BTreeMap;
use std::fmt;

use crate::source::{RawConfig, RawSection};

/// The type constraint applied to a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Any string.
    String,
    /// A base-10 integer, optionally bounded (inclusive).
    Integer { min: Option<i64>, max: Option<i64> },
    /// One of an enumerated set of strings.
    Choice(Vec<String>),
}

/// Whether a field must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Absent fields take this value, which is checked like an explicit one.
    Default(String),
    Optional,
}

/// A single key of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    key: String,
    check: Check,
    presence: Presence,
}

impl FieldSpec {
    fn new(key: impl Into<String>, check: Check) -> Self {
        Self {
            key: key.into(),
            check,
            presence: Presence::Required,
        }
    }

    /// A required string field.
    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, Check::String)
    }

    /// A required, unbounded integer field.
    pub fn integer(key: impl Into<String>) -> Self {
        Self::new(key, Check::Integer { min: None, max: None })
    }

    /// A required field restricted to `options`.
    pub fn choice<I, S>(key: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(key, Check::Choice(options.into_iter().map(Into::into).collect()))
    }

    /// Lower bound for an integer field. Ignored for other checks.
    pub fn min(mut self, bound: i64) -> Self {
        if let Check::Integer { min, .. } = &mut self.check {
            *min = Some(bound);
        }
        self
    }

    /// Upper bound for an integer field. Ignored for other checks.
    pub fn max(mut self, bound: i64) -> Self {
        if let Check::Integer { max, .. } = &mut self.check {
            *max = Some(bound);
        }
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.presence = Presence::Default(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    fn convert(&self, raw: &str) -> Result<Value, Reason> {
        match &self.check {
            Check::String => Ok(Value::Str(raw.to_string())),
            Check::Integer { min, max } => {
                let n: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| Reason::WrongType(raw.to_string()))?;
                if min.is_some_and(|m| n < m) {
                    return Err(Reason::TooSmall(raw.to_string()));
                }
                if max.is_some_and(|m| n > m) {
                    return Err(Reason::TooBig(raw.to_string()));
                }
                Ok(Value::Int(n))
            }
            Check::Choice(options) => {
                if options.iter().any(|o| o == raw) {
                    Ok(Value::Str(raw.to_string()))
                } else {
                    Err(Reason::Unacceptable(raw.to_string()))
                }
            }
        }
    }
}

/// Ordered field declarations for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSchema {
    fields: Vec<FieldSpec>,
}

impl SectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate one raw section, appending failures to `errors`.
    ///
    /// A missing section behaves like an empty one.
    pub fn validate(
        &self,
        name: &str,
        raw: Option<&RawSection>,
        errors: &mut ValidationErrors,
    ) -> Section {
        let mut section = Section::default();

        for field in &self.fields {
            let raw_value = match (raw.and_then(|r| r.get(field.key())), &field.presence) {
                (Some(v), _) => v.as_str(),
                (None, Presence::Default(d)) => d.as_str(),
                (None, Presence::Optional) => continue,
                (None, Presence::Required) => {
                    errors.push(FieldError::new(name, field.key(), Reason::MissingRequired));
                    continue;
                }
            };

            match field.convert(raw_value) {
                Ok(value) => {
                    section.values.insert(field.key.clone(), value);
                }
                Err(reason) => errors.push(FieldError::new(name, field.key(), reason)),
            }
        }

        section
    }
}

/// Named sections validated in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    sections: Vec<(String, SectionSchema)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: impl Into<String>, schema: SectionSchema) -> Self {
        self.sections.push((name.into(), schema));
        self
    }

    /// Run one validation pass over `raw`.
    ///
    /// # Errors
    ///
    /// Returns every field failure found across all sections.
    pub fn validate(&self, raw: &RawConfig) -> Result<ValidatedConfig, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut sections = BTreeMap::new();

        for (name, schema) in &self.sections {
            let section = schema.validate(name, raw.section(name), &mut errors);
            sections.insert(name.clone(), section);
        }

        if errors.is_empty() {
            Ok(ValidatedConfig { sections })
        } else {
            Err(errors)
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Str(_) => None,
        }
    }
}

/// The validated content of one section. Optional fields that were absent
/// have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    values: BTreeMap<String, Value>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output of a successful [`Schema::validate`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedConfig {
    sections: BTreeMap<String, Section>,
}

impl ValidatedConfig {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Remove and return a section.
    pub fn take(&mut self, name: &str) -> Section {
        self.sections.remove(name).unwrap_or_default()
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    MissingRequired,
    WrongType(String),
    Unacceptable(String),
    TooSmall(String),
    TooBig(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::MissingRequired => f.write_str("missing required"),
            Reason::WrongType(v) => write!(f, "the value \"{v}\" is of the wrong type."),
            Reason::Unacceptable(v) => write!(f, "the value \"{v}\" is unacceptable."),
            Reason::TooSmall(v) => write!(f, "the value \"{v}\" is too small."),
            Reason::TooBig(v) => write!(f, "the value \"{v}\" is too big."),
        }
    }
}

/// A failure located by its section path and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub sections: Vec<String>,
    pub key: String,
    pub reason: Reason,
}

impl FieldError {
    pub fn new(section: &str, key: &str, reason: Reason) -> Self {
        Self {
            sections: vec![section.to_string()],
            key: key.to_string(),
            reason,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' in [", self.key)?;
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{section}'")?;
        }
        write!(f, "] : {}", self.reason)
    }
}

/// Every failure of a validation pass, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.0 {
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawConfig {
        RawConfig::from_ini_str(text).unwrap()
    }

    fn server_schema() -> Schema {
        Schema::new().section(
            "server",
            SectionSchema::new()
                .field(FieldSpec::choice("handler", ["file", "mock"]).default("file"))
                .field(FieldSpec::string("host").default("localhost"))
                .field(FieldSpec::integer("port").min(0).max(65535).default("8088"))
                .field(FieldSpec::integer("pool_size").min(1).optional()),
        )
    }

    #[test]
    fn test_defaults_fill_missing_section() {
        let config = server_schema().validate(&RawConfig::default()).unwrap();
        let server = config.section("server").unwrap();

        assert_eq!(server.str("handler"), Some("file"));
        assert_eq!(server.str("host"), Some("localhost"));
        assert_eq!(server.int("port"), Some(8088));
        assert!(server.get("pool_size").is_none());
    }

    #[test]
    fn test_explicit_values() {
        let config = server_schema()
            .validate(&raw("[server]\nhandler = mock\nport = 80\npool_size = 4\n"))
            .unwrap();
        let server = config.section("server").unwrap();

        assert_eq!(server.str("handler"), Some("mock"));
        assert_eq!(server.int("port"), Some(80));
        assert_eq!(server.int("pool_size"), Some(4));
    }

    #[test]
    fn test_wrong_type_message() {
        let err = server_schema()
            .validate(&raw("[server]\nport = string\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'port' in ['server'] : the value \"string\" is of the wrong type.\n"
        );
    }

    #[test]
    fn test_unacceptable_choice_message() {
        let err = server_schema()
            .validate(&raw("[server]\nhandler = unknown\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'handler' in ['server'] : the value \"unknown\" is unacceptable.\n"
        );
    }

    #[test]
    fn test_bounds() {
        let err = server_schema()
            .validate(&raw("[server]\nport = 70000\npool_size = 0\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'port' in ['server'] : the value \"70000\" is too big.\n\
             'pool_size' in ['server'] : the value \"0\" is too small.\n"
        );
    }

    #[test]
    fn test_missing_required_is_distinct_from_wrong_type() {
        let schema = Schema::new().section(
            "handler",
            SectionSchema::new()
                .field(FieldSpec::string("folder"))
                .field(FieldSpec::integer("cache_size").default("100")),
        );

        let err = schema.validate(&RawConfig::default()).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.to_string(), "'folder' in ['handler'] : missing required\n");

        let err = schema
            .validate(&raw("[handler]\ncache_size = lots\n"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'folder' in ['handler'] : missing required\n\
             'cache_size' in ['handler'] : the value \"lots\" is of the wrong type.\n"
        );
    }

    #[test]
    fn test_invalid_default_is_reported() {
        let schema = Schema::new().section(
            "server",
            SectionSchema::new().field(FieldSpec::choice("handler", ["mock"]).default("file")),
        );

        let err = schema.validate(&RawConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'handler' in ['server'] : the value \"file\" is unacceptable.\n"
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = server_schema()
            .validate(&raw("[server]\nworkers = many\n"))
            .unwrap();
        assert!(config.section("server").unwrap().get("workers").is_none());
    }

    #[test]
    fn test_multi_section_path_display() {
        let err = FieldError {
            sections: vec!["server".into(), "tls".into()],
            key: "cert".into(),
            reason: Reason::MissingRequired,
        };
        assert_eq!(err.to_string(), "'cert' in ['server', 'tls'] : missing required");
    }
}
