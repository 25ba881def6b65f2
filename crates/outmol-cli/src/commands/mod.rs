pub mod extract;
pub mod table;
