pub mod acquisition;
pub mod parser;

pub use acquisition::{acquire_diff, extract_article_text};
pub use parser::{parse_diff, strip_added_markers, FileDiff, Hunk};
