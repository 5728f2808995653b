// Public modules
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{FetchError, SalaryError};
pub use models::{Salary, SalaryRange, SearchCriteria, Vacancy};
pub use providers::{Provider, VacancyClient};
pub use store::{AddOutcome, VacancyStore};
