pub mod category;
pub mod person;
pub mod settings;
pub mod task;
pub mod transaction;
