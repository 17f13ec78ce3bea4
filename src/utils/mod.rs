pub mod num;
pub mod time;
