use crate::analysis::resolver::resolve_form;
use crate::error::{AppError, AppResult};
use crate::storage::entity::application::Model as ApplicationModel;
use crate::storage::entity::field_response::Model as FieldResponseModel;
use crate::storage::entity::form_field::Model as FormFieldModel;
use crate::storage::repository::{ApplicationRepository, OpeningRepository};
use chrono::DateTime;
use regex::{Captures, Regex};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::OnceLock;

const FIXED_COLUMNS: [&str; 6] = [
    "Name",
    "Year of Study",
    "Phone Number",
    "Email",
    "Branch",
    "Prior Experience",
];
const SUBMITTED_AT_COLUMN: &str = "Submitted At";

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// Wraps a cell in double quotes, doubling any quote inside it.
pub fn escape_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn export_filename(title: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]").expect("static pattern"));
    // One `_` per UTF-16 unit, so astral characters become `__`.
    let safe = re.replace_all(title, |caps: &Captures| "_".repeat(caps[0].encode_utf16().count()));
    format!("{safe}_applications.csv")
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Renders one row per application. Custom columns come from the form schema;
/// an applicant with no answer to a field gets an empty cell.
pub fn render_csv(
    fields: &[FormFieldModel],
    applications: &[ApplicationModel],
    responses: &[FieldResponseModel],
) -> String {
    let mut answers: HashMap<(i32, i32), &FieldResponseModel> = HashMap::new();
    for r in responses {
        answers.entry((r.application_id, r.field_id)).or_insert(r);
    }

    let header: Vec<&str> = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(fields.iter().map(|f| f.field_title.as_str()))
        .chain(std::iter::once(SUBMITTED_AT_COLUMN))
        .collect();

    let mut lines = Vec::with_capacity(applications.len() + 1);
    lines.push(header.join(","));

    for app in applications {
        let mut cells = vec![
            app.name.clone(),
            app.year_of_study.as_str().to_string(),
            app.phone_number.clone(),
            app.email.clone(),
            app.branch.clone(),
            app.prior_experience.clone().unwrap_or_default(),
        ];
        for field in fields {
            let cell = match answers.get(&(app.id, field.id)) {
                Some(r) if !r.response_value.is_empty() => r.response_value.clone(),
                Some(r) => r.file_url.clone().unwrap_or_default(),
                None => String::new(),
            };
            cells.push(cell);
        }
        cells.push(format_timestamp(app.submitted_at));

        let row: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

pub async fn export_csv(db: &DatabaseConnection, opening_id: i32) -> AppResult<CsvExport> {
    let opening = OpeningRepository::find_by_id(db, opening_id)
        .await?
        .ok_or_else(|| AppError::not_found("Opening not found"))?;

    let applications =
        ApplicationRepository::list_for_opening_chronological(db, opening_id).await?;
    if applications.is_empty() {
        return Err(AppError::not_found("No applications found for this opening"));
    }

    let schema = resolve_form(db, opening_id).await?;
    let ids: Vec<i32> = applications.iter().map(|a| a.id).collect();
    let responses = ApplicationRepository::responses_for_applications(db, &ids).await?;

    Ok(CsvExport {
        filename: export_filename(&opening.title),
        body: render_csv(&schema.fields, &applications, &responses),
    })
}
