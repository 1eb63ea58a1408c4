//! Input validation for client profiles.
//!
//! Two layers live here:
//! - field-level rules run by the profile form on every edit and again at submit time
//!   ([`validate_field`], [`validate_form`]);
//! - payload rules enforced by the directory service before anything is stored
//!   ([`validate_payload`]).

use crate::constants::{
    MAX_AGE, MAX_BACKGROUND_CHARS, MAX_CUSTOM_GENDER_CHARS, MAX_FULL_NAME_CHARS, MIN_AGE,
    MIN_FULL_NAME_CHARS,
};
use crate::form::ClientForm;
use crate::{ClientError, ClientPayload, ClientResult, Gender, NonEmptyText, TextError};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Editable fields of the client profile form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    FullName,
    Age,
    Gender,
    CustomGender,
    Background,
}

impl FormField {
    /// Fields that must be valid before a submit may proceed.
    pub const REQUIRED: [FormField; 3] = [FormField::FullName, FormField::Age, FormField::Gender];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::FullName => "full_name",
            FormField::Age => "age",
            FormField::Gender => "gender",
            FormField::CustomGender => "custom_gender",
            FormField::Background => "background",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_name" => Ok(FormField::FullName),
            "age" => Ok(FormField::Age),
            "gender" => Ok(FormField::Gender),
            "custom_gender" => Ok(FormField::CustomGender),
            "background" => Ok(FormField::Background),
            other => Err(ClientError::InvalidInput(format!(
                "unknown form field: {other}"
            ))),
        }
    }
}

/// A single field-scoped validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooShort,
    NotANumber,
    OutOfRange,
}

impl FieldError {
    /// The message shown next to `field`.
    pub fn message(&self, field: FormField) -> &'static str {
        match (field, self) {
            (FormField::FullName, FieldError::Required) => "Client name is required",
            (FormField::FullName, FieldError::TooShort) => "Name must be at least 2 characters",
            (FormField::Age, FieldError::Required) => "Age is required",
            (FormField::Age, FieldError::NotANumber) => "Age must be a number",
            (FormField::Age, FieldError::OutOfRange) => "Age must be between 0 and 120",
            (FormField::Gender, FieldError::Required) => "Gender selection is required",
            (_, FieldError::Required) => "This field is required",
            (_, FieldError::TooShort) => "Value is too short",
            (_, FieldError::NotANumber) => "Value must be a number",
            (_, FieldError::OutOfRange) => "Value is out of range",
        }
    }
}

/// The error set shown on the profile form: per-field errors plus one general banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<FormField, FieldError>,
    general: Option<String>,
}

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<FieldError> {
        self.fields.get(&field).copied()
    }

    /// The display message for `field`, if it currently has an error.
    pub fn message(&self, field: FormField) -> Option<&'static str> {
        self.get(field).map(|e| e.message(field))
    }

    pub fn set(&mut self, field: FormField, error: FieldError) {
        self.fields.insert(field, error);
    }

    pub fn clear(&mut self, field: FormField) {
        self.fields.remove(&field);
    }

    /// True when no field has an error. The general banner is not counted.
    pub fn has_field_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.general = Some(message.into());
    }

    pub fn clear_general(&mut self) {
        self.general = None;
    }

    /// Field errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, FieldError)> + '_ {
        self.fields.iter().map(|(f, e)| (*f, *e))
    }
}

/// Parses the age field.
///
/// Accepts an optionally signed run of ASCII digits surrounded by whitespace. Anything else is
/// `NotANumber`; numbers outside `0..=120` (including ones too large to represent) are
/// `OutOfRange`.
pub fn parse_age(value: &str) -> Result<u8, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required);
    }

    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::NotANumber);
    }

    let age = match trimmed.parse::<i64>() {
        Ok(n) => n,
        Err(_) => return Err(FieldError::OutOfRange),
    };
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(FieldError::OutOfRange);
    }

    u8::try_from(age).map_err(|_| FieldError::OutOfRange)
}

fn check_field(field: FormField, value: &str) -> Option<FieldError> {
    match field {
        FormField::FullName => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Some(FieldError::Required)
            } else if trimmed.chars().count() < MIN_FULL_NAME_CHARS {
                Some(FieldError::TooShort)
            } else {
                None
            }
        }
        FormField::Age => parse_age(value).err(),
        FormField::Gender => match value.parse::<Gender>() {
            Ok(_) => None,
            Err(_) => Some(FieldError::Required),
        },
        FormField::CustomGender | FormField::Background => None,
    }
}

/// Re-checks one field and returns the updated error set.
///
/// Only `field`'s entry changes; other field errors and the general banner are carried over.
pub fn validate_field(field: FormField, value: &str, current: &FieldErrors) -> FieldErrors {
    let mut updated = current.clone();
    match check_field(field, value) {
        Some(error) => updated.set(field, error),
        None => updated.clear(field),
    }
    updated
}

/// Runs every required-field rule against the whole form.
pub fn validate_form(form: &ClientForm) -> FieldErrors {
    FormField::REQUIRED
        .into_iter()
        .fold(FieldErrors::default(), |errors, field| {
            validate_field(field, form.get(field), &errors)
        })
}

/// Editable fields after service-side validation and normalisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedClient {
    pub full_name: NonEmptyText,
    pub age: u8,
    pub gender: Gender,
    pub custom_gender: Option<String>,
    pub background: Option<String>,
}

/// Validates a create/update payload the way the directory service does before storing it.
///
/// The name is trimmed, `custom_gender` is dropped unless the gender is `other`, and empty
/// optional strings become `None`.
///
/// # Errors
///
/// Returns `ClientError::InvalidInput` describing the first violated rule.
pub fn validate_payload(payload: &ClientPayload) -> ClientResult<ValidatedClient> {
    let full_name =
        NonEmptyText::with_bounds(&payload.full_name, MIN_FULL_NAME_CHARS, MAX_FULL_NAME_CHARS)
            .map_err(|e| match e {
                TextError::Empty => ClientError::InvalidInput("Full name cannot be empty".into()),
                TextError::TooShort { min } => ClientError::InvalidInput(format!(
                    "Full name must be at least {min} characters"
                )),
                TextError::TooLong { max } => ClientError::InvalidInput(format!(
                    "Full name must be at most {max} characters"
                )),
            })?;

    if !(MIN_AGE..=MAX_AGE).contains(&payload.age) {
        return Err(ClientError::InvalidInput(format!(
            "Age must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }
    let age = u8::try_from(payload.age)
        .map_err(|_| ClientError::InvalidInput("Age must be between 0 and 120".into()))?;

    let custom_gender = match payload.gender {
        Gender::Other => non_blank(payload.custom_gender.as_deref()),
        _ => None,
    };
    if let Some(label) = &custom_gender {
        if label.chars().count() > MAX_CUSTOM_GENDER_CHARS {
            return Err(ClientError::InvalidInput(format!(
                "Custom gender must be at most {MAX_CUSTOM_GENDER_CHARS} characters"
            )));
        }
    }

    let background = non_blank(payload.background.as_deref());
    if let Some(text) = &background {
        if text.chars().count() > MAX_BACKGROUND_CHARS {
            return Err(ClientError::InvalidInput(format!(
                "Background must be at most {MAX_BACKGROUND_CHARS} characters"
            )));
        }
    }

    Ok(ValidatedClient {
        full_name,
        age,
        gender: payload.gender,
        custom_gender,
        background,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(full_name: &str, age: &str, gender: &str) -> ClientForm {
        let mut form = ClientForm::blank();
        form.set(FormField::FullName, full_name);
        form.set(FormField::Age, age);
        form.set(FormField::Gender, gender);
        form
    }

    fn payload(full_name: &str, age: i64, gender: Gender) -> ClientPayload {
        ClientPayload {
            full_name: full_name.into(),
            age,
            gender,
            custom_gender: None,
            background: None,
        }
    }

    #[test]
    fn full_name_rules() {
        let none = FieldErrors::default();

        let errors = validate_field(FormField::FullName, "   ", &none);
        assert_eq!(errors.get(FormField::FullName), Some(FieldError::Required));
        assert_eq!(
            errors.message(FormField::FullName),
            Some("Client name is required")
        );

        let errors = validate_field(FormField::FullName, " J ", &none);
        assert_eq!(errors.get(FormField::FullName), Some(FieldError::TooShort));

        for name in ["Al", " Al ", "Jordan Smith", "Zoë"] {
            let errors = validate_field(FormField::FullName, name, &none);
            assert_eq!(errors.get(FormField::FullName), None, "{name:?}");
        }
    }

    #[test]
    fn every_in_range_age_is_accepted() {
        let none = FieldErrors::default();
        for age in 0..=120 {
            let errors = validate_field(FormField::Age, &age.to_string(), &none);
            assert_eq!(errors.get(FormField::Age), None, "age {age}");
        }
    }

    #[test]
    fn out_of_range_and_non_numeric_ages_are_rejected() {
        let none = FieldErrors::default();
        for age in ["-1", "121", "150", "1000", "99999999999999999999999"] {
            let errors = validate_field(FormField::Age, age, &none);
            assert_eq!(errors.get(FormField::Age), Some(FieldError::OutOfRange), "{age}");
        }
        for age in ["abc", "12a", "1.5", "-", "+", "1 2", "0x10"] {
            let errors = validate_field(FormField::Age, age, &none);
            assert_eq!(errors.get(FormField::Age), Some(FieldError::NotANumber), "{age}");
        }
        for age in ["", "   "] {
            let errors = validate_field(FormField::Age, age, &none);
            assert_eq!(errors.get(FormField::Age), Some(FieldError::Required), "{age:?}");
        }
    }

    #[test]
    fn gender_requires_a_known_selection() {
        let none = FieldErrors::default();
        assert_eq!(
            validate_field(FormField::Gender, "", &none).get(FormField::Gender),
            Some(FieldError::Required)
        );
        assert_eq!(
            validate_field(FormField::Gender, "unknown", &none).get(FormField::Gender),
            Some(FieldError::Required)
        );
        for gender in Gender::ALL {
            assert_eq!(
                validate_field(FormField::Gender, gender.as_str(), &none).get(FormField::Gender),
                None
            );
        }
    }

    #[test]
    fn validate_field_only_touches_the_given_field() {
        let mut current = FieldErrors::default();
        current.set(FormField::Age, FieldError::OutOfRange);
        current.set_general("Please complete all required fields");

        let updated = validate_field(FormField::FullName, "", &current);

        assert_eq!(updated.get(FormField::Age), Some(FieldError::OutOfRange));
        assert_eq!(updated.get(FormField::FullName), Some(FieldError::Required));
        assert_eq!(updated.general(), Some("Please complete all required fields"));

        let cleared = validate_field(FormField::Age, "40", &updated);
        assert_eq!(cleared.get(FormField::Age), None);
    }

    #[test]
    fn free_text_fields_never_error() {
        let none = FieldErrors::default();
        assert!(validate_field(FormField::Background, "", &none).is_empty());
        assert!(validate_field(FormField::CustomGender, "", &none).is_empty());
    }

    #[test]
    fn validate_form_accepts_minimal_valid_input() {
        let errors = validate_form(&form("Al", "120", "male"));
        assert!(!errors.has_field_errors());
    }

    #[test]
    fn validate_form_reports_all_required_fields() {
        let errors = validate_form(&form("", "150", ""));

        assert_eq!(errors.get(FormField::FullName), Some(FieldError::Required));
        assert_eq!(errors.get(FormField::Age), Some(FieldError::OutOfRange));
        assert_eq!(errors.get(FormField::Gender), Some(FieldError::Required));
        assert_eq!(errors.iter().count(), 3);
    }

    #[test]
    fn form_field_parses_wire_names() {
        for field in [
            FormField::FullName,
            FormField::Age,
            FormField::Gender,
            FormField::CustomGender,
            FormField::Background,
        ] {
            assert_eq!(field.as_str().parse::<FormField>().unwrap(), field);
        }
        assert!("fullName".parse::<FormField>().is_err());
    }

    #[test]
    fn validate_payload_trims_name_and_drops_custom_gender_unless_other() {
        let mut p = payload("  Jordan Smith ", 34, Gender::Female);
        p.custom_gender = Some("ignored".into());

        let validated = validate_payload(&p).unwrap();
        assert_eq!(validated.full_name.as_str(), "Jordan Smith");
        assert_eq!(validated.custom_gender, None);

        p.gender = Gender::Other;
        let validated = validate_payload(&p).unwrap();
        assert_eq!(validated.custom_gender.as_deref(), Some("ignored"));
    }

    #[test]
    fn validate_payload_allows_other_without_label() {
        let mut p = payload("Sam", 30, Gender::Other);
        p.custom_gender = Some("  ".into());

        let validated = validate_payload(&p).unwrap();
        assert_eq!(validated.custom_gender, None);
    }

    #[test]
    fn validate_payload_rejects_bad_values() {
        assert!(validate_payload(&payload("", 30, Gender::Male)).is_err());
        assert!(validate_payload(&payload("A", 30, Gender::Male)).is_err());
        assert!(validate_payload(&payload(&"a".repeat(201), 30, Gender::Male)).is_err());
        assert!(validate_payload(&payload("Al", -1, Gender::Male)).is_err());
        assert!(validate_payload(&payload("Al", 121, Gender::Male)).is_err());

        let mut p = payload("Al", 30, Gender::Male);
        p.background = Some("x".repeat(2401));
        let err = validate_payload(&p).unwrap_err();
        assert!(err.to_string().contains("2400"));

        p.background = Some("x".repeat(2400));
        assert!(validate_payload(&p).is_ok());

        let mut p = payload("Al", 30, Gender::Other);
        p.custom_gender = Some("y".repeat(101));
        assert!(validate_payload(&p).is_err());
    }
}
