pub mod compose;
pub mod emit;
pub mod validate;
