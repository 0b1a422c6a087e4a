pub mod format;
pub mod molfile;
