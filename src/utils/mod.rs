pub mod clock;
pub mod format;
pub mod hijri;
pub mod input;
pub mod report;
