pub mod application_repo;
pub mod form_field_repo;
pub mod form_repo;
pub mod opening_repo;
pub mod user_repo;

pub use application_repo::{
    ApplicationFilter, ApplicationRepository, ApplicationWithResponses, GroupCountRow, GroupKey,
    NewApplication, NewFieldResponse,
};
pub use form_field_repo::{FieldOrder, FormFieldDto, FormFieldPatch, FormFieldRepository, NewFormField};
pub use form_repo::FormRepository;
pub use opening_repo::{NewOpening, OpeningFilter, OpeningPatch, OpeningRepository};
pub use user_repo::{NewUser, UserPatch, UserRepository};
