pub mod builder;
pub mod location;
pub mod node;
pub mod visitor;
