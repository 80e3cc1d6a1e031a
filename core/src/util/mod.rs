pub mod bounds;
pub mod materialize;
