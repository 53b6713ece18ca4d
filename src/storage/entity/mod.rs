pub mod application;
pub mod field_response;
pub mod form;
pub mod form_field;
pub mod opening;
pub mod user;

pub use application::Entity as Application;
pub use field_response::Entity as FieldResponse;
pub use form::Entity as Form;
pub use form_field::Entity as FormField;
pub use opening::Entity as Opening;
pub use user::Entity as User;
