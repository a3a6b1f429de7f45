pub mod estimate;
pub mod page;
