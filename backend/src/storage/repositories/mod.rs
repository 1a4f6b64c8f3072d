pub mod category_repository;
pub mod person_repository;
pub mod settings_repository;
pub mod task_repository;
pub mod transaction_repository;

pub use category_repository::CategoryRepository;
pub use person_repository::PersonRepository;
pub use settings_repository::SettingsRepository;
pub use task_repository::{CompletionRepository, TaskRepository};
pub use transaction_repository::TransactionRepository;
