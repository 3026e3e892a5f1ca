pub mod commands;
pub mod errors;
pub mod events;
pub mod fine;
pub mod item;
pub mod loan;
pub mod member;
pub mod schedule;
pub mod value_objects;

pub use errors::*;
pub use events::*;
pub use value_objects::*;
