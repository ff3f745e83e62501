use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DIRS: OnceLock<Option<Dirs>> = OnceLock::new();

struct Dirs {
    cache_dir: PathBuf,
}

fn dirs() -> Option<&'static Dirs> {
    DIRS.get_or_init(|| {
        let dirs = directories_next::BaseDirs::new()?;
        Some(Dirs { cache_dir: dirs.cache_dir().join("better-bookmarks") })
    })
    .as_ref()
}

/// The default bookmark cache directory, `None` if there is no home directory to put it in.
pub fn cache() -> Option<&'static Path> {
    dirs().map(|dirs| dirs.cache_dir.as_path())
}
