use std::io;
use std::path::{Path, PathBuf};

pub trait PathExt {
    /// Make the path absolute without touching the filesystem (symlinks are not resolved).
    /// Relative paths are resolved against the current working directory.
    fn absolutize(&self) -> io::Result<PathBuf>;
}

impl PathExt for Path {
    fn absolutize(&self) -> io::Result<PathBuf> {
        std::path::absolute(self)
    }
}
