use crate::analysis::aggregator::{aggregate, AggregateResult, FieldAggregate};
use crate::analysis::model::{
    FieldSummary, FormSchema, IndividualResponse, IndividualView, QuestionResponse, QuestionView,
    SummaryView, ValueCount,
};
use crate::analysis::resolver::resolve_form;
use crate::error::{AppError, AppResult};
use crate::storage::repository::{ApplicationRepository, FormFieldRepository, OpeningRepository};
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap};

pub async fn load_aggregate(
    db: &DatabaseConnection,
    schema: &FormSchema,
) -> AppResult<AggregateResult> {
    let applications =
        ApplicationRepository::list_for_opening_chronological(db, schema.opening.id).await?;
    let ids: Vec<i32> = applications.iter().map(|a| a.id).collect();
    let responses = ApplicationRepository::responses_for_applications(db, &ids).await?;
    Ok(aggregate(&schema.fields, &applications, &responses))
}

pub async fn summary_view(db: &DatabaseConnection, opening_id: i32) -> AppResult<SummaryView> {
    let schema = resolve_form(db, opening_id).await?;
    let result = load_aggregate(db, &schema).await?;
    Ok(project_summary(&result, schema.form.has_prior_exp))
}

fn fixed(title: &str, field_type: &str, total: u64, responses: Vec<ValueCount>) -> FieldSummary {
    FieldSummary {
        field_id: None,
        field_title: title.to_string(),
        field_type: field_type.to_string(),
        is_fixed: true,
        total_responses: total,
        responses,
    }
}

fn to_map(counts: &[ValueCount]) -> BTreeMap<String, u64> {
    counts.iter().map(|c| (c.value.clone(), c.count)).collect()
}

/// Fixed pseudo-fields first (Name, Year, Branch, Phone, Email, optionally
/// Prior Experience), then custom fields in schema order.
pub fn project_summary(result: &AggregateResult, has_prior_exp: bool) -> SummaryView {
    let n = result.total_applications;
    let mut summaries = vec![
        fixed("Name", "SHORT_ANSWER", n, Vec::new()),
        fixed(
            "Year of Study",
            "MULTIPLE_CHOICE",
            n,
            result.year_distribution.clone(),
        ),
        fixed("Branch", "SHORT_ANSWER", n, result.branch_distribution.clone()),
        fixed("Phone Number", "SHORT_ANSWER", n, Vec::new()),
        fixed("Email", "SHORT_ANSWER", n, Vec::new()),
    ];
    if has_prior_exp {
        summaries.push(fixed(
            "Prior Experience",
            "LONG_ANSWER",
            result.prior_experience_responses,
            Vec::new(),
        ));
    }

    summaries.extend(result.fields.iter().map(|agg| {
        let field = agg.field();
        let responses = match agg {
            FieldAggregate::Choice { counts, .. } => counts.clone(),
            FieldAggregate::Count { .. } => Vec::new(),
        };
        FieldSummary {
            field_id: Some(field.id),
            field_title: field.field_title.clone(),
            field_type: field.input_type.as_str().to_string(),
            is_fixed: false,
            total_responses: agg.total(),
            responses,
        }
    }));

    SummaryView {
        total_applications: n,
        field_summaries: summaries,
        branch_distribution: to_map(&result.branch_distribution),
        year_distribution: to_map(&result.year_distribution),
    }
}

pub async fn question_view(
    db: &DatabaseConnection,
    opening_id: i32,
    field_id: Option<i32>,
) -> AppResult<QuestionView> {
    let field_id =
        field_id.ok_or_else(|| AppError::bad_request("fieldId query parameter is required"))?;
    let schema = resolve_form(db, opening_id).await?;
    let field = schema
        .field(field_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Form field not found for this opening"))?;

    let mut responses: Vec<QuestionResponse> =
        ApplicationRepository::responses_for_field(db, field_id)
            .await?
            .into_iter()
            .filter_map(|(r, app)| {
                let app = app.filter(|a| a.opening_id == opening_id)?;
                Some(QuestionResponse {
                    application_id: app.id,
                    applicant_name: app.name,
                    applicant_email: app.email,
                    response_value: r.response_value,
                    file_url: r.file_url,
                    submitted_at: app.submitted_at,
                })
            })
            .collect();
    responses.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then(b.application_id.cmp(&a.application_id))
    });

    Ok(QuestionView {
        field: field.into(),
        responses,
    })
}

pub async fn individual_view(
    db: &DatabaseConnection,
    opening_id: i32,
    application_id: i32,
) -> AppResult<IndividualView> {
    let opening = OpeningRepository::find_by_id(db, opening_id)
        .await?
        .ok_or_else(|| AppError::not_found("Opening not found"))?;
    let application = ApplicationRepository::find_by_id(db, application_id)
        .await?
        .filter(|a| a.opening_id == opening_id)
        .ok_or_else(|| AppError::not_found("Application not found for this opening"))?;

    let fields = FormFieldRepository::list_by_form(db, application.form_id).await?;
    let position: HashMap<i32, usize> = fields.iter().enumerate().map(|(i, f)| (f.id, i)).collect();

    let mut answered: Vec<(usize, IndividualResponse)> =
        ApplicationRepository::responses_for_applications(db, &[application.id])
            .await?
            .into_iter()
            .filter_map(|r| {
                let idx = *position.get(&r.field_id)?;
                let field = &fields[idx];
                Some((
                    idx,
                    IndividualResponse {
                        field_id: field.id,
                        field_title: field.field_title.clone(),
                        input_type: field.input_type,
                        is_required: field.is_required,
                        response_value: r.response_value,
                        file_url: r.file_url,
                    },
                ))
            })
            .collect();
    answered.sort_by_key(|(idx, _)| *idx);

    Ok(IndividualView {
        application,
        opening,
        responses: answered.into_iter().map(|(_, r)| r).collect(),
    })
}
