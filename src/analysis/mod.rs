//! Reporting over an opening's submissions: schema resolution, aggregation,
//! the summary/question/individual read models, and CSV export.

pub mod aggregator;
pub mod export;
pub mod model;
pub mod projector;
pub mod resolver;

pub use export::export_csv;
pub use model::{FormSchema, IndividualView, QuestionView, SummaryView};
pub use projector::{individual_view, question_view, summary_view};
pub use resolver::resolve_form;
