pub mod console;
pub mod mtree;
