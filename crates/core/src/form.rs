//! Client profile form state.

use crate::constants::MAX_BACKGROUND_CHARS;
use crate::validation::{parse_age, FormField};
use crate::{ClientPayload, ClientRecord, Gender};
use therapist_types::truncate_chars;

/// Raw field values for one client profile form, exactly as typed.
///
/// `gender` holds the selected option's wire name, or an empty string when nothing is selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientForm {
    full_name: String,
    age: String,
    gender: String,
    custom_gender: String,
    background: String,
}

impl ClientForm {
    /// An empty form for a new client.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A form pre-filled from an existing record.
    pub fn from_record(record: &ClientRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            age: record.age.to_string(),
            gender: record.gender.as_str().to_string(),
            custom_gender: record.custom_gender.clone().unwrap_or_default(),
            background: record.background.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FullName => &self.full_name,
            FormField::Age => &self.age,
            FormField::Gender => &self.gender,
            FormField::CustomGender => &self.custom_gender,
            FormField::Background => &self.background,
        }
    }

    /// Stores `value` for `field`.
    ///
    /// Background text beyond 2400 characters is cut off, never stored.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let mut value = value.into();
        match field {
            FormField::FullName => self.full_name = value,
            FormField::Age => self.age = value,
            FormField::Gender => self.gender = value,
            FormField::CustomGender => self.custom_gender = value,
            FormField::Background => {
                let keep = truncate_chars(&value, MAX_BACKGROUND_CHARS).len();
                value.truncate(keep);
                self.background = value;
            }
        }
    }

    pub fn selected_gender(&self) -> Option<Gender> {
        self.gender.parse().ok()
    }

    /// Whether the custom gender input should be shown.
    pub fn shows_custom_gender(&self) -> bool {
        self.selected_gender() == Some(Gender::Other)
    }

    pub fn remaining_background_chars(&self) -> usize {
        MAX_BACKGROUND_CHARS.saturating_sub(self.background.chars().count())
    }

    /// Builds the payload sent to the directory.
    ///
    /// Returns `None` when age or gender cannot be interpreted; callers validate first.
    /// `custom_gender` is only included for `other` with a non-blank label, and `background`
    /// only when non-empty.
    pub fn to_payload(&self) -> Option<ClientPayload> {
        let age = parse_age(&self.age).ok()?;
        let gender = self.selected_gender()?;

        let custom_gender = match gender {
            Gender::Other if !self.custom_gender.trim().is_empty() => {
                Some(self.custom_gender.trim().to_string())
            }
            _ => None,
        };
        let background = if self.background.is_empty() {
            None
        } else {
            Some(self.background.clone())
        };

        Some(ClientPayload {
            full_name: self.full_name.trim().to_string(),
            age: i64::from(age),
            gender,
            custom_gender,
            background,
        })
    }
}
