pub mod error;
pub mod shorthand;
