pub mod content_kind;
pub mod loaders;
pub mod outcome;
pub mod validation;

pub use content_kind::{ContentKind, MARKER_TABLE};
pub use loaders::{load_course_list, CourseList};
pub use outcome::{FixOutcome, ItemRecord, RunSummary};
pub use validation::{canonical_url, CourseTarget, Credentials, FixedPoolRegistry, ValidationItem};
