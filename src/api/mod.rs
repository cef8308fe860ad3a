pub mod extract;

pub use extract::{parse_resource_id, ValidatedJson};
