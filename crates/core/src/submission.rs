//! Submission coordinator for the client profile form.
//!
//! Drives one form through `Idle → Validating → Submitting → {Success, Failed}`. The
//! coordinator never performs I/O on its own: [`SubmissionCoordinator::begin_submit`] hands out
//! the payload to send and [`SubmissionCoordinator::finish_submit`] takes the directory's answer.
//! The [`SubmissionCoordinator::submit`] helper wires both halves to a [`ClientDirectory`].
//!
//! Time is passed in explicitly so the success indicator window can be tested without sleeping.

use crate::constants::{
    INCOMPLETE_FORM_MESSAGE, SAVE_FAILED_FALLBACK_MESSAGE, SUCCESS_INDICATOR_TTL,
};
use crate::validation::{validate_field, validate_form, FieldErrors, FormField};
use crate::{ClientDirectory, ClientForm, ClientPayload, ClientRecord, DirectoryError};
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Which directory operation a submit maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(u64),
}

/// A validated submit waiting to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSubmit {
    pub target: SubmitTarget,
    pub payload: ClientPayload,
}

/// Why a submit attempt did not produce a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("{}", INCOMPLETE_FORM_MESSAGE)]
    Invalid,
}

#[derive(Clone, Debug)]
pub struct SubmissionCoordinator {
    form: ClientForm,
    errors: FieldErrors,
    state: SubmissionState,
    record: Option<ClientRecord>,
    editing: bool,
    success_at: Option<Instant>,
}

impl SubmissionCoordinator {
    /// Coordinator for the create flow: blank form, already in edit mode.
    pub fn for_new_client() -> Self {
        Self {
            form: ClientForm::blank(),
            errors: FieldErrors::default(),
            state: SubmissionState::Idle,
            record: None,
            editing: true,
            success_at: None,
        }
    }

    /// Coordinator for an existing client, showing the record read-only until edit begins.
    pub fn for_record(record: ClientRecord) -> Self {
        Self {
            form: ClientForm::from_record(&record),
            errors: FieldErrors::default(),
            state: SubmissionState::Idle,
            record: Some(record),
            editing: false,
            success_at: None,
        }
    }

    pub fn form(&self) -> &ClientForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// The last record the directory confirmed.
    pub fn record(&self) -> Option<&ClientRecord> {
        self.record.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn general_error(&self) -> Option<&str> {
        self.errors.general()
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Applies one field change and re-validates that field.
    ///
    /// Any edit hides the success indicator.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
        self.errors = validate_field(field, self.form.get(field), &self.errors);
        self.success_at = None;
        if self.state == SubmissionState::Success {
            self.state = SubmissionState::Idle;
        }
    }

    /// Validates the whole form and, if it passes, moves to `Submitting`.
    ///
    /// # Errors
    ///
    /// `SubmitRejected::InFlight` while a previous submit is outstanding (nothing changes), or
    /// `SubmitRejected::Invalid` when required fields fail; the field errors and the general
    /// banner are then populated and the state returns to `Idle`.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SubmitRejected> {
        if self.state == SubmissionState::Submitting {
            return Err(SubmitRejected::InFlight);
        }

        self.state = SubmissionState::Validating;
        let errors = validate_form(&self.form);
        let payload = match self.form.to_payload() {
            Some(payload) if !errors.has_field_errors() => payload,
            _ => {
                self.errors = errors;
                self.errors.set_general(INCOMPLETE_FORM_MESSAGE);
                self.state = SubmissionState::Idle;
                return Err(SubmitRejected::Invalid);
            }
        };

        self.errors = FieldErrors::default();
        self.success_at = None;
        self.state = SubmissionState::Submitting;

        let target = match &self.record {
            Some(record) => SubmitTarget::Update(record.id),
            None => SubmitTarget::Create,
        };
        Ok(PendingSubmit { target, payload })
    }

    /// Applies the directory's answer to the outstanding submit.
    ///
    /// Ignored unless a submit is in flight.
    pub fn finish_submit(&mut self, result: Result<ClientRecord, DirectoryError>, now: Instant) {
        if self.state != SubmissionState::Submitting {
            tracing::warn!("submission result arrived with no submit in flight");
            return;
        }

        match result {
            Ok(record) => {
                self.form = ClientForm::from_record(&record);
                self.record = Some(record);
                self.errors = FieldErrors::default();
                self.editing = false;
                self.success_at = Some(now);
                self.state = SubmissionState::Success;
            }
            Err(err) => {
                tracing::error!("failed to save client profile: {}", err);
                let message = err
                    .banner_message()
                    .unwrap_or_else(|| SAVE_FAILED_FALLBACK_MESSAGE.to_string());
                self.errors.set_general(message);
                self.state = SubmissionState::Failed;
            }
        }
    }

    /// Runs a full submit against `directory`.
    ///
    /// Returns the resulting state; a rejected attempt leaves the state as `begin_submit` set it.
    pub async fn submit<D>(&mut self, directory: &D) -> SubmissionState
    where
        D: ClientDirectory + ?Sized,
    {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(_) => return self.state,
        };

        let result = match pending.target {
            SubmitTarget::Create => directory.create_client(&pending.payload).await,
            SubmitTarget::Update(id) => directory.update_client(id, &pending.payload).await,
        };
        self.finish_submit(result, Instant::now());
        self.state
    }

    /// Abandons the edit, restoring the form from the last confirmed record.
    ///
    /// Returns `false` in the create flow, where there is nothing to restore, and while a submit
    /// is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.state == SubmissionState::Submitting {
            return false;
        }
        let Some(record) = &self.record else {
            return false;
        };

        self.form = ClientForm::from_record(record);
        self.errors = FieldErrors::default();
        self.editing = false;
        self.state = SubmissionState::Idle;
        true
    }

    /// Whether the success indicator should be shown at `now`.
    pub fn success_visible(&self, now: Instant) -> bool {
        match self.success_at {
            Some(at) => now.saturating_duration_since(at) < SUCCESS_INDICATOR_TTL,
            None => false,
        }
    }

    /// Drops the success indicator once its window has passed.
    pub fn expire_success(&mut self, now: Instant) {
        if self.success_at.is_some() && !self.success_visible(now) {
            self.success_at = None;
        }
    }
}
