//! Seed helpers shared by the database-backed tests.

use crate::analysis::FormSchema;
use crate::storage::entity::application::YearOfStudy;
use crate::storage::entity::form_field::InputType;
use crate::storage::entity::opening::{Model as OpeningModel, WorkType};
use crate::storage::entity::user::{Model as UserModel, Role};
use crate::storage::repository::{
    ApplicationRepository, ApplicationWithResponses, FormRepository, NewApplication,
    NewFieldResponse, NewFormField, NewOpening, NewUser, OpeningRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: Role) -> UserModel {
    UserRepository::create(
        db,
        NewUser {
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            role: Some(role),
            is_active: Some(true),
        },
    )
    .await
    .expect("seed user")
}

pub async fn seed_admin(db: &DatabaseConnection) -> UserModel {
    seed_user(db, "admin@example.com", Role::Admin).await
}

pub async fn seed_leader(db: &DatabaseConnection, email: &str) -> UserModel {
    seed_user(db, email, Role::Leader).await
}

pub async fn seed_opening(db: &DatabaseConnection, created_by_id: i32, is_active: bool) -> OpeningModel {
    let opening = OpeningRepository::create(
        db,
        NewOpening {
            title: "Backend Developer".to_string(),
            domain: "Technical".to_string(),
            work_type: WorkType::Remote,
            number_of_slots: 3,
            pre_text: "Join us".to_string(),
            about_role: "APIs".to_string(),
            skills_required: "Rust".to_string(),
            extra_info: None,
        },
        created_by_id,
    )
    .await
    .expect("seed opening");
    if is_active {
        opening
    } else {
        OpeningRepository::toggle_status(db, opening)
            .await
            .expect("deactivate opening")
    }
}

pub async fn seed_form(
    db: &DatabaseConnection,
    opening: &OpeningModel,
    created_by_id: i32,
    has_prior_exp: bool,
    fields: Vec<NewFormField>,
) -> FormSchema {
    let (form, fields) =
        FormRepository::create_with_fields(db, opening.id, has_prior_exp, created_by_id, fields)
            .await
            .expect("seed form");
    FormSchema {
        opening: opening.clone(),
        form,
        fields,
    }
}

pub fn choice_field(title: &str, options: &[&str], is_required: bool) -> NewFormField {
    NewFormField {
        field_title: title.to_string(),
        input_type: InputType::MultipleChoice,
        is_required,
        options: Some(options.iter().map(|o| o.to_string()).collect()),
        order: None,
    }
}

/// Stores an application straight through the repository, bypassing validation.
pub async fn submit(
    db: &DatabaseConnection,
    schema: &FormSchema,
    email: &str,
    branch: &str,
    year_of_study: YearOfStudy,
    answers: Vec<(i32, &str)>,
) -> ApplicationWithResponses {
    ApplicationRepository::create_with_responses(
        db,
        NewApplication {
            opening_id: schema.opening.id,
            form_id: schema.form.id,
            name: email.split('@').next().unwrap_or(email).to_string(),
            year_of_study,
            phone_number: "5550100".to_string(),
            email: email.to_string(),
            branch: branch.to_string(),
            prior_experience: schema.form.has_prior_exp.then(|| "some".to_string()),
            field_responses: answers
                .into_iter()
                .map(|(field_id, v)| NewFieldResponse {
                    field_id,
                    response_value: Some(v.to_string()),
                    file_url: None,
                })
                .collect(),
        },
    )
    .await
    .expect("seed application")
}
