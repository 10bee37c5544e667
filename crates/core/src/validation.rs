//! Field limits and validation rules shared by every input schema.
//!
//! Schemas derive [`validator::Validate`] and point their `custom` rules at
//! the functions here. [`parse_validated`] is the single entry point that
//! turns an untyped JSON body into a checked schema value.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::patch::Patch;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_PROJECT_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_PACKAGE_NAME_LENGTH: usize = 100;
pub const MAX_APP_NAME_LENGTH: usize = 100;
pub const MAX_VERSION_NAME_LENGTH: usize = 20;
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MAX_FILE_PATH_LENGTH: usize = 500;
pub const MAX_MIME_TYPE_LENGTH: usize = 100;
pub const MAX_BUILD_VERSION_LENGTH: usize = 50;

/// Android-style reverse-domain package identifier, e.g. `com.example.app`.
pub const PACKAGE_NAME_PATTERN: &str = r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)*$";

static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PACKAGE_NAME_PATTERN).expect("valid regex"));

/// Field name reported when a body cannot be decoded at all.
pub const BODY_FIELD: &str = "<body>";

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub fn is_valid_package_name(value: &str) -> bool {
    PACKAGE_NAME_RE.is_match(value)
}

/// `custom` rule for package identifiers.
pub fn validate_package_name(value: &str) -> Result<(), ValidationError> {
    if is_valid_package_name(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("package_name").with_message(Cow::Owned(format!(
        "'{value}' is not a reverse-domain package name (expected {PACKAGE_NAME_PATTERN})"
    )));
    err.add_param(Cow::Borrowed("value"), &value);
    Err(err)
}

/// Length check counted in Unicode scalar values, matching the `length`
/// rule of the derive.
pub fn check_max_chars(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() <= max {
        return Ok(());
    }
    let mut err = ValidationError::new("length");
    err.add_param(Cow::Borrowed("max"), &max);
    Err(err)
}

/// Patch rule for a NOT NULL column: an explicit `null` is rejected.
pub fn check_required_patch(value: &Patch<String>, max: usize) -> Result<(), ValidationError> {
    match value {
        Patch::Absent => Ok(()),
        Patch::Null => Err(not_nullable()),
        Patch::Value(v) => check_max_chars(v, max),
    }
}

/// Patch rule for a column that `null` resets to its empty value.
pub fn check_clearable_patch(value: &Patch<String>, max: usize) -> Result<(), ValidationError> {
    match value {
        Patch::Value(v) => check_max_chars(v, max),
        Patch::Absent | Patch::Null => Ok(()),
    }
}

/// Patch rule for the package identifier: NOT NULL, length, then pattern.
pub fn check_package_name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_required_patch(value, MAX_PACKAGE_NAME_LENGTH)?;
    match value.value() {
        Some(v) => validate_package_name(v),
        None => Ok(()),
    }
}

/// Patch rule for non-string NOT NULL fields.
pub fn check_not_null<T>(value: &Patch<T>) -> Result<(), ValidationError> {
    if value.is_null() {
        Err(not_nullable())
    } else {
        Ok(())
    }
}

fn not_nullable() -> ValidationError {
    ValidationError::new("not_nullable").with_message(Cow::Borrowed("must not be null"))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Decode an untyped JSON value into `T` and run its validation rules.
pub fn parse_validated<T>(value: serde_json::Value) -> Result<T, CoreError>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_path_to_error::deserialize(value).map_err(decode_error)?;
    parsed.validate()?;
    Ok(parsed)
}

/// Byte-slice variant of [`parse_validated`], for raw request bodies.
pub fn parse_validated_slice<T>(bytes: &[u8]) -> Result<T, CoreError>
where
    T: DeserializeOwned + Validate,
{
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let parsed: T = serde_path_to_error::deserialize(&mut de).map_err(decode_error)?;
    de.end()
        .map_err(|err| CoreError::validation(BODY_FIELD, "type", err.to_string()))?;
    parsed.validate()?;
    Ok(parsed)
}

/// Name the field a decode failure happened at, e.g. `name` or
/// `config.theme`. A missing field is reported against its parent, so its
/// own name is appended.
fn decode_error(err: serde_path_to_error::Error<serde_json::Error>) -> CoreError {
    let message = err.inner().to_string();
    let path = err.path();
    let at_root = path.iter().next().is_none();

    let field = match (at_root, missing_field(&message)) {
        (true, Some(name)) => name.to_string(),
        (true, None) => BODY_FIELD.to_string(),
        (false, Some(name)) => format!("{path}.{name}"),
        (false, None) => path.to_string(),
    };
    CoreError::Validation {
        field,
        rule: "type".to_string(),
        message,
    }
}

/// serde only exposes the name of a missing field through its message.
fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

impl From<ValidationErrors> for CoreError {
    /// Report the first offending field in name order so the result is
    /// stable across runs.
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, &Vec<ValidationError>)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let first = fields
            .into_iter()
            .find_map(|(field, errs)| errs.first().map(|err| (field, err)));

        match first {
            Some((field, err)) => CoreError::Validation {
                field,
                rule: err.code.to_string(),
                message: describe(err),
            },
            None => CoreError::validation(BODY_FIELD, "invalid", errors.to_string()),
        }
    }
}

fn describe(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    match err.code.as_ref() {
        "length" => match err.params.get("max") {
            Some(max) => format!("must be at most {max} characters"),
            None => "has an invalid length".to_string(),
        },
        "range" => match err.params.get("min") {
            Some(min) => format!("must be at least {min}"),
            None => "is out of range".to_string(),
        },
        other => format!("failed rule `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_reverse_domain_names() {
        for name in ["com.example.demo", "app", "a.b.c", "com.my_app2.x9", "io.z"] {
            assert!(is_valid_package_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "Com.Example",
            "1app.bad",
            "no dots but spaces",
            "",
            "com..example",
            "com.example.",
            ".com.example",
            "com.1example",
            "com-example",
        ] {
            assert!(!is_valid_package_name(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn package_rule_reports_package_name_code() {
        let err = validate_package_name("Com.Example").unwrap_err();
        assert_eq!(err.code, "package_name");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let ten_wide = "é".repeat(10);
        assert!(check_max_chars(&ten_wide, 10).is_ok());
        assert!(check_max_chars(&ten_wide, 9).is_err());
    }

    #[test]
    fn required_patch_rejects_null() {
        let err = check_required_patch(&Patch::Null, 10).unwrap_err();
        assert_eq!(err.code, "not_nullable");
        assert!(check_required_patch(&Patch::Absent, 10).is_ok());
        assert!(check_required_patch(&Patch::Value("ok".into()), 10).is_ok());
    }

    #[test]
    fn clearable_patch_accepts_null() {
        assert!(check_clearable_patch(&Patch::Null, 10).is_ok());
        assert!(check_clearable_patch(&Patch::Value("x".repeat(11)), 10).is_err());
    }

    #[test]
    fn package_patch_checks_pattern() {
        assert!(check_package_name_patch(&Patch::Value("com.ok".into())).is_ok());
        let err = check_package_name_patch(&Patch::Value("Bad".into())).unwrap_err();
        assert_eq!(err.code, "package_name");
    }

    #[test]
    fn validation_errors_convert_to_first_field() {
        let mut errors = ValidationErrors::new();
        errors.add("zeta", ValidationError::new("length"));
        errors.add("alpha", check_max_chars("toolong", 3).unwrap_err());

        let core: CoreError = errors.into();
        assert_matches!(
            core,
            CoreError::Validation { ref field, ref rule, ref message }
                if field == "alpha" && rule == "length" && message == "must be at most 3 characters"
        );
    }

    #[test]
    fn decode_error_names_missing_field() {
        #[derive(Debug, serde::Deserialize, Validate)]
        struct Needs {
            #[allow(dead_code)]
            name: String,
        }

        let err = parse_validated::<Needs>(serde_json::json!({})).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation { ref field, ref rule, .. } if field == "name" && rule == "type"
        );
    }

    #[derive(Debug, serde::Deserialize, Validate)]
    #[allow(dead_code)]
    struct Sample {
        #[validate(length(max = 5))]
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn decode_error_names_wrong_type_field() {
        let err = parse_validated::<Sample>(serde_json::json!({ "name": 123 })).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation { ref field, ref rule, ref message }
                if field == "name" && rule == "type" && message.contains("expected a string")
        );
    }

    #[test]
    fn decode_error_names_sequence_element() {
        let err = parse_validated::<Sample>(serde_json::json!({ "name": "a", "tags": ["x", 1] }))
            .unwrap_err();
        assert_matches!(err, CoreError::Validation { ref field, .. } if field == "tags[1]");
    }

    #[test]
    fn decode_error_on_non_object_body() {
        let err = parse_validated::<Sample>(serde_json::json!("just a string")).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation { ref field, ref rule, .. } if field == BODY_FIELD && rule == "type"
        );
    }

    #[test]
    fn slice_input_is_decoded_and_validated() {
        let ok: Sample = parse_validated_slice(br#"{ "name": "abc" }"#).unwrap();
        assert_eq!(ok.name, "abc");

        let err = parse_validated_slice::<Sample>(br#"{ "name": "abcdef" }"#).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation { ref field, ref rule, .. } if field == "name" && rule == "length"
        );

        let err = parse_validated_slice::<Sample>(br#"{ "name": false }"#).unwrap_err();
        assert_matches!(err, CoreError::Validation { ref field, .. } if field == "name");

        let err = parse_validated_slice::<Sample>(br#"{ "name": "abc" } trailing"#).unwrap_err();
        assert_matches!(err, CoreError::Validation { ref field, .. } if field == BODY_FIELD);

        let err = parse_validated_slice::<Sample>(b"{ not json").unwrap_err();
        assert_matches!(err, CoreError::Validation { ref rule, .. } if rule == "type");
    }
}
