//! Plain-text rendering of client records and profile tabs.

use std::fmt::Write;
use therapist_core::{
    ClientForm, ClientRecord, FieldErrors, FormField, Gender, ProfileTab, ProfileView,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Gender as shown to the therapist; a custom label replaces "Other".
pub fn gender_display(record: &ClientRecord) -> String {
    match (record.gender, record.custom_gender.as_deref()) {
        (Gender::Other, Some(label)) => label.to_string(),
        (Gender::Other, None) => "Other".to_string(),
        (gender, _) => gender.label().to_string(),
    }
}

pub fn summary_line(record: &ClientRecord) -> String {
    format!(
        "ID: {}, Name: {}, Age: {}, Gender: {}, Created: {}",
        record.id,
        record.full_name,
        record.age,
        gender_display(record),
        record.created_at.format(TIMESTAMP_FORMAT)
    )
}

/// Renders whichever tab is active.
pub fn render_tab(view: &ProfileView) -> String {
    let mut out = String::new();
    let tabs: Vec<String> = ProfileTab::ALL
        .iter()
        .map(|tab| {
            if *tab == view.active_tab() {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" | "));

    let Some(record) = view.record() else {
        return out;
    };

    match view.active_tab() {
        ProfileTab::Overview => out.push_str(&render_overview(record)),
        ProfileTab::Sessions => {
            let _ = writeln!(out, "No sessions recorded for {}.", record.full_name);
        }
        ProfileTab::Insights => {
            let _ = writeln!(out, "No AI insights available for {}.", record.full_name);
        }
        ProfileTab::Edit => out.push_str(&render_form(view.coordinator().form())),
    }
    out
}

fn render_overview(record: &ClientRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Client #{} ({})", record.id, record.uuid);
    let _ = writeln!(out, "Name:       {}", record.full_name);
    let _ = writeln!(out, "Age:        {}", record.age);
    let _ = writeln!(out, "Gender:     {}", gender_display(record));
    let _ = writeln!(
        out,
        "Background: {}",
        record
            .background
            .as_deref()
            .unwrap_or("No background information provided.")
    );
    let _ = writeln!(out, "Created:    {}", record.created_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Updated:    {}", record.updated_at.format(TIMESTAMP_FORMAT));
    out
}

fn render_form(form: &ClientForm) -> String {
    let mut out = String::new();
    for field in [FormField::FullName, FormField::Age, FormField::Gender] {
        let _ = writeln!(out, "{} *: {}", field, form.get(field));
    }
    if form.shows_custom_gender() {
        let _ = writeln!(
            out,
            "{}: {}",
            FormField::CustomGender,
            form.get(FormField::CustomGender)
        );
    }
    let _ = writeln!(
        out,
        "{}: {}",
        FormField::Background,
        form.get(FormField::Background)
    );
    let _ = writeln!(
        out,
        "({} characters remaining)",
        form.remaining_background_chars()
    );
    out
}

/// One line per field error, then the general banner if any.
pub fn render_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, error) in errors.iter() {
        let _ = writeln!(out, "  {}: {}", field, error.message(field));
    }
    if let Some(general) = errors.general() {
        let _ = writeln!(out, "{general}");
    }
    out
}
