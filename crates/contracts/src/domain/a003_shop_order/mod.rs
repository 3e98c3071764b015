pub mod aggregate;
pub mod line_item;
