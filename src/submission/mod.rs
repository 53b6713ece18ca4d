pub mod service;
pub mod validate;

pub use service::SubmissionService;
