pub mod toml_loader;

pub use toml_loader::{load_course_list, parse_course_list, CourseList};
