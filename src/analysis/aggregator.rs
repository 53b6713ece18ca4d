use crate::analysis::model::ValueCount;
use crate::storage::entity::application::Model as ApplicationModel;
use crate::storage::entity::field_response::Model as FieldResponseModel;
use crate::storage::entity::form_field::{InputType, Model as FormFieldModel};
use std::collections::HashMap;

/// How the responses to one custom field are summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationStrategy {
    /// Count occurrences of each distinct answer.
    ChoiceCounts,
    /// Only count how many answers exist; free text has unbounded cardinality.
    ResponseCount,
}

impl AggregationStrategy {
    pub fn for_input(input_type: InputType) -> Self {
        match input_type {
            InputType::MultipleChoice | InputType::MultipleCorrect => {
                AggregationStrategy::ChoiceCounts
            }
            InputType::ShortAnswer | InputType::LongAnswer | InputType::UploadDoc => {
                AggregationStrategy::ResponseCount
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAggregate {
    Choice {
        field: FormFieldModel,
        total: u64,
        counts: Vec<ValueCount>,
    },
    Count {
        field: FormFieldModel,
        total: u64,
    },
}

impl FieldAggregate {
    pub fn field(&self) -> &FormFieldModel {
        match self {
            FieldAggregate::Choice { field, .. } | FieldAggregate::Count { field, .. } => field,
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            FieldAggregate::Choice { total, .. } | FieldAggregate::Count { total, .. } => *total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    pub total_applications: u64,
    pub branch_distribution: Vec<ValueCount>,
    pub year_distribution: Vec<ValueCount>,
    pub prior_experience_responses: u64,
    pub fields: Vec<FieldAggregate>,
}

/// Counts values in order of first occurrence. Blank values are not a choice.
pub fn count_values<'a, I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<ValueCount> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for v in values {
        if v.trim().is_empty() {
            continue;
        }
        match index.get(v) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(v, out.len());
                out.push(ValueCount {
                    value: v.to_string(),
                    count: 1,
                });
            }
        }
    }
    out
}

fn is_answered(r: &FieldResponseModel) -> bool {
    !r.response_value.trim().is_empty() || r.file_url.as_deref().is_some_and(|u| !u.is_empty())
}

/// Builds every aggregate of an opening in one pass over its applications.
///
/// `applications` must already be in submission order; responses are
/// re-sequenced to follow it, so choice counts list values in the order
/// applicants first gave them regardless of how the store returned rows.
pub fn aggregate(
    fields: &[FormFieldModel],
    applications: &[ApplicationModel],
    responses: &[FieldResponseModel],
) -> AggregateResult {
    let rank: HashMap<i32, usize> = applications
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id, i))
        .collect();

    let mut ordered: Vec<(usize, &FieldResponseModel)> = responses
        .iter()
        .filter_map(|r| rank.get(&r.application_id).map(|&i| (i, r)))
        .collect();
    ordered.sort_by_key(|(i, r)| (*i, r.id));

    let mut by_field: HashMap<i32, Vec<&FieldResponseModel>> = HashMap::new();
    for (_, r) in ordered {
        by_field.entry(r.field_id).or_default().push(r);
    }

    let field_aggregates = fields
        .iter()
        .map(|field| {
            let rows = by_field.get(&field.id).map(Vec::as_slice).unwrap_or(&[]);
            match AggregationStrategy::for_input(field.input_type) {
                AggregationStrategy::ChoiceCounts => {
                    let counts = count_values(rows.iter().map(|r| r.response_value.as_str()));
                    FieldAggregate::Choice {
                        field: field.clone(),
                        total: counts.iter().map(|c| c.count).sum(),
                        counts,
                    }
                }
                AggregationStrategy::ResponseCount => FieldAggregate::Count {
                    field: field.clone(),
                    total: rows.iter().filter(|r| is_answered(r)).count() as u64,
                },
            }
        })
        .collect();

    AggregateResult {
        total_applications: applications.len() as u64,
        branch_distribution: count_values(applications.iter().map(|a| a.branch.as_str())),
        year_distribution: count_values(applications.iter().map(|a| a.year_of_study.as_str())),
        prior_experience_responses: applications
            .iter()
            .filter(|a| a.prior_experience.as_deref().is_some_and(|p| !p.trim().is_empty()))
            .count() as u64,
        fields: field_aggregates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::entity::application::YearOfStudy;

    fn field(id: i32, title: &str, input_type: InputType, order: i32) -> FormFieldModel {
        FormFieldModel {
            id,
            form_id: 1,
            field_title: title.to_string(),
            input_type,
            is_required: false,
            options_json: None,
            field_order: order,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn app(id: i32, branch: &str, year: YearOfStudy, submitted_at: i64) -> ApplicationModel {
        ApplicationModel {
            id,
            opening_id: 1,
            form_id: 1,
            name: format!("applicant {id}"),
            year_of_study: year,
            phone_number: "5550100".to_string(),
            email: format!("a{id}@example.com"),
            branch: branch.to_string(),
            prior_experience: None,
            submitted_at,
        }
    }

    fn resp(id: i32, application_id: i32, field_id: i32, value: &str) -> FieldResponseModel {
        FieldResponseModel {
            id,
            application_id,
            field_id,
            response_value: value.to_string(),
            file_url: None,
        }
    }

    fn vc(value: &str, count: u64) -> ValueCount {
        ValueCount {
            value: value.to_string(),
            count,
        }
    }

    #[test]
    fn strategy_table_covers_every_input_type() {
        use AggregationStrategy::*;
        assert_eq!(AggregationStrategy::for_input(InputType::MultipleChoice), ChoiceCounts);
        assert_eq!(AggregationStrategy::for_input(InputType::MultipleCorrect), ChoiceCounts);
        assert_eq!(AggregationStrategy::for_input(InputType::ShortAnswer), ResponseCount);
        assert_eq!(AggregationStrategy::for_input(InputType::LongAnswer), ResponseCount);
        assert_eq!(AggregationStrategy::for_input(InputType::UploadDoc), ResponseCount);
    }

    #[test]
    fn team_choice_counts_in_first_occurrence_order() {
        let fields = [field(10, "Team", InputType::MultipleChoice, 1)];
        let apps = [
            app(1, "CS", YearOfStudy::First, 100),
            app(2, "CS", YearOfStudy::Second, 200),
            app(3, "IT", YearOfStudy::Second, 300),
        ];
        let responses = [resp(1, 1, 10, "Red"), resp(2, 2, 10, "Red"), resp(3, 3, 10, "Blue")];

        let result = aggregate(&fields, &apps, &responses);
        match &result.fields[0] {
            FieldAggregate::Choice { counts, total, .. } => {
                assert_eq!(counts, &vec![vc("Red", 2), vc("Blue", 1)]);
                assert_eq!(*total, 3);
            }
            other => panic!("expected choice aggregate, got {other:?}"),
        }
    }

    #[test]
    fn response_order_follows_applications_not_store() {
        let fields = [field(10, "Team", InputType::MultipleChoice, 1)];
        let apps = [
            app(7, "CS", YearOfStudy::First, 100),
            app(3, "CS", YearOfStudy::First, 200),
        ];
        // The store hands back the later applicant's answer first.
        let responses = [resp(1, 3, 10, "Blue"), resp(2, 7, 10, "Red")];

        let result = aggregate(&fields, &apps, &responses);
        let FieldAggregate::Choice { counts, .. } = &result.fields[0] else {
            panic!("expected choice aggregate");
        };
        assert_eq!(counts, &vec![vc("Red", 1), vc("Blue", 1)]);
    }

    #[test]
    fn blank_choices_are_not_counted() {
        let fields = [field(10, "Stack", InputType::MultipleCorrect, 1)];
        let apps = [
            app(1, "CS", YearOfStudy::First, 1),
            app(2, "CS", YearOfStudy::First, 2),
            app(3, "CS", YearOfStudy::First, 3),
        ];
        let responses = [resp(1, 1, 10, ""), resp(2, 2, 10, "  "), resp(3, 3, 10, "Rust")];

        let result = aggregate(&fields, &apps, &responses);
        let FieldAggregate::Choice { counts, total, .. } = &result.fields[0] else {
            panic!("expected choice aggregate");
        };
        assert_eq!(counts, &vec![vc("Rust", 1)]);
        assert_eq!(*total, 1);
    }

    #[test]
    fn free_text_only_reports_a_count() {
        let fields = [
            field(10, "Why us", InputType::LongAnswer, 1),
            field(11, "Resume", InputType::UploadDoc, 2),
        ];
        let apps = [
            app(1, "CS", YearOfStudy::First, 1),
            app(2, "CS", YearOfStudy::First, 2),
        ];
        let mut upload = resp(4, 2, 11, "");
        upload.file_url = Some("https://files.example.com/r.pdf".to_string());
        let responses = [
            resp(1, 1, 10, "because"),
            resp(2, 2, 10, "why not"),
            resp(3, 1, 11, ""),
            upload,
        ];

        let result = aggregate(&fields, &apps, &responses);
        assert!(matches!(result.fields[0], FieldAggregate::Count { total: 2, .. }));
        assert!(matches!(result.fields[1], FieldAggregate::Count { total: 1, .. }));
    }

    #[test]
    fn distributions_sum_to_application_count() {
        let apps = [
            app(1, "CS", YearOfStudy::First, 1),
            app(2, "IT", YearOfStudy::Second, 2),
            app(3, "CS", YearOfStudy::Second, 3),
            app(4, "ECE", YearOfStudy::Fourth, 4),
        ];
        let result = aggregate(&[], &apps, &[]);
        let branch_sum: u64 = result.branch_distribution.iter().map(|c| c.count).sum();
        let year_sum: u64 = result.year_distribution.iter().map(|c| c.count).sum();
        assert_eq!(result.total_applications, 4);
        assert_eq!(branch_sum, 4);
        assert_eq!(year_sum, 4);
        assert_eq!(
            result.branch_distribution,
            vec![vc("CS", 2), vc("IT", 1), vc("ECE", 1)]
        );
    }

    #[test]
    fn no_applications_gives_zeroes() {
        let fields = [
            field(10, "Team", InputType::MultipleChoice, 1),
            field(11, "Bio", InputType::ShortAnswer, 2),
        ];
        let result = aggregate(&fields, &[], &[]);
        assert_eq!(result.total_applications, 0);
        assert!(result.branch_distribution.is_empty());
        assert!(result.year_distribution.is_empty());
        assert_eq!(result.prior_experience_responses, 0);
        assert!(result.fields.iter().all(|f| f.total() == 0));
    }

    #[test]
    fn responses_from_other_openings_are_ignored() {
        let fields = [field(10, "Team", InputType::MultipleChoice, 1)];
        let apps = [app(1, "CS", YearOfStudy::First, 1)];
        let responses = [resp(1, 1, 10, "Red"), resp(2, 99, 10, "Blue")];

        let result = aggregate(&fields, &apps, &responses);
        assert_eq!(result.fields[0].total(), 1);
    }
}
