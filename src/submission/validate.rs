use crate::error::AppError;
use crate::storage::entity::form::Model as FormModel;
use crate::storage::entity::form_field::{InputType, Model as FormFieldModel};
use crate::storage::entity::opening::Model as OpeningModel;
use crate::storage::repository::form_field_repo::decode_options;
use crate::storage::repository::NewApplication;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"))
}

/// A MULTIPLE_CORRECT answer is either one option verbatim or a
/// comma-separated list of options, stored as `A, B`.
fn normalise_selection(value: &str, options: &[String]) -> Option<String> {
    if options.iter().any(|o| o == value) {
        return Some(value.to_string());
    }
    let parts: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let all_known = !parts.is_empty() && parts.iter().all(|p| options.iter().any(|o| o == p));
    all_known.then(|| parts.join(", "))
}

/// Checks a submission against its opening and form and returns it normalised
/// (trimmed fixed fields, prior experience dropped when the form does not ask).
pub fn validate_submission(
    mut new: NewApplication,
    opening: &OpeningModel,
    form: &FormModel,
    fields: &[FormFieldModel],
) -> Result<NewApplication, AppError> {
    new.name = new.name.trim().to_string();
    new.phone_number = new.phone_number.trim().to_string();
    new.email = new.email.trim().to_lowercase();
    new.branch = new.branch.trim().to_string();

    let missing: Vec<&str> = [
        ("name", &new.name),
        ("phoneNumber", &new.phone_number),
        ("email", &new.email),
        ("branch", &new.branch),
    ]
    .iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(k, _)| *k)
    .collect();
    if !missing.is_empty() {
        return Err(AppError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    if !email_pattern().is_match(&new.email) {
        return Err(AppError::bad_request("Invalid email address"));
    }

    if !opening.is_active {
        return Err(AppError::bad_request(
            "This opening is no longer accepting applications",
        ));
    }
    if form.opening_id != opening.id || new.form_id != form.id {
        return Err(AppError::bad_request("Form does not belong to this opening"));
    }

    if form.has_prior_exp {
        let blank = new
            .prior_experience
            .as_deref()
            .map_or(true, |p| p.trim().is_empty());
        if blank {
            return Err(AppError::bad_request("Prior experience is required"));
        }
    } else {
        new.prior_experience = None;
    }

    let by_id: HashMap<i32, &FormFieldModel> = fields.iter().map(|f| (f.id, f)).collect();
    let mut seen = HashSet::new();
    for r in new.field_responses.iter_mut() {
        let Some(field) = by_id.get(&r.field_id) else {
            return Err(AppError::bad_request(format!(
                "Unknown form field {}",
                r.field_id
            )));
        };
        if !seen.insert(r.field_id) {
            return Err(AppError::bad_request(format!(
                "Duplicate response for field '{}'",
                field.field_title
            )));
        }
        if !field.input_type.is_choice() {
            continue;
        }
        // Stored exactly as checked, so equal answers aggregate together.
        let given = r.response_value.as_deref().unwrap_or("").trim().to_string();
        if given.is_empty() {
            r.response_value = Some(given);
            continue;
        }
        let options = decode_options(field).unwrap_or_default();
        let checked = match field.input_type {
            InputType::MultipleCorrect => normalise_selection(&given, &options),
            _ => options.iter().any(|o| *o == given).then(|| given.clone()),
        };
        let Some(checked) = checked else {
            return Err(AppError::bad_request(format!(
                "'{}' is not an option of '{}'",
                given, field.field_title
            )));
        };
        r.response_value = Some(checked);
    }

    for field in fields.iter().filter(|f| f.is_required) {
        let answered = new.field_responses.iter().any(|r| {
            r.field_id == field.id
                && (r.response_value.as_deref().is_some_and(|v| !v.trim().is_empty())
                    || r.file_url.as_deref().is_some_and(|u| !u.trim().is_empty()))
        });
        if !answered {
            return Err(AppError::bad_request(format!(
                "Missing response for required field '{}'",
                field.field_title
            )));
        }
    }

    Ok(new)
}
