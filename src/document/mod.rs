pub mod classify;
pub mod frontmatter;
pub mod scan;

pub use classify::{classify, ActionDescriptor, ActionKind};
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use scan::{scan_folder, ScannedDocument};
