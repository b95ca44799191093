mod builder;
mod walker;

pub use builder::{BuildError, DocBuilder};
pub use walker::{display_path, source_language, walk_tree, DirListing, FileEntry};
