// Execution of composed queries against sea-orm entities

pub mod entity_source;

pub use entity_source::{EntitySource, build_condition, build_select};
