use crate::storage::entity::application::Model as ApplicationModel;
use crate::storage::entity::form::Model as FormModel;
use crate::storage::entity::form_field::{InputType, Model as FormFieldModel};
use crate::storage::entity::opening::Model as OpeningModel;
use crate::storage::repository::FormFieldDto;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct FormSchema {
    pub opening: OpeningModel,
    pub form: FormModel,
    pub fields: Vec<FormFieldModel>,
}

impl FormSchema {
    pub fn field(&self, field_id: i32) -> Option<&FormFieldModel> {
        self.fields.iter().find(|f| f.id == field_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub field_id: Option<i32>,
    pub field_title: String,
    pub field_type: String,
    pub is_fixed: bool,
    pub total_responses: u64,
    pub responses: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub total_applications: u64,
    pub field_summaries: Vec<FieldSummary>,
    pub branch_distribution: BTreeMap<String, u64>,
    pub year_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionField {
    pub id: i32,
    pub field_title: String,
    pub input_type: InputType,
    pub is_required: bool,
    pub options: Option<Vec<String>>,
}

impl From<FormFieldModel> for QuestionField {
    fn from(model: FormFieldModel) -> Self {
        let dto = FormFieldDto::from(model);
        Self {
            id: dto.id,
            field_title: dto.field_title,
            input_type: dto.input_type,
            is_required: dto.is_required,
            options: dto.options,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub application_id: i32,
    pub applicant_name: String,
    pub applicant_email: String,
    pub response_value: String,
    pub file_url: Option<String>,
    pub submitted_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub field: QuestionField,
    pub responses: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualResponse {
    pub field_id: i32,
    pub field_title: String,
    pub input_type: InputType,
    pub is_required: bool,
    pub response_value: String,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndividualView {
    pub application: ApplicationModel,
    pub opening: OpeningModel,
    pub responses: Vec<IndividualResponse>,
}
