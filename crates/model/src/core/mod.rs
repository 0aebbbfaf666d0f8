pub mod data_type;
pub mod identifiers;
pub mod utils;
pub mod value;
