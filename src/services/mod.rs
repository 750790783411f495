pub mod editor_repair;
pub mod hover;
pub mod markup;
pub mod tinymce;
pub mod warn_writer;

pub use editor_repair::{repair_editor, RepairReport, RichTextEditor};
pub use hover::{hover_and_click, HoverSettings};
pub use markup::{BrokenImageReference, EditorMarkup};
pub use tinymce::TinyMceEditor;
pub use warn_writer::WarnWriter;
