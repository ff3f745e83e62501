pub mod path;
pub mod sync;
