#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod profile_service;
pub mod progress_service;
pub mod quiz;

pub use lingo_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use error::{
    AppServicesError, CatalogServiceError, ProfileServiceError, ProgressServiceError,
    QuizServiceError,
};
pub use profile_service::ProfileService;
pub use progress_service::{ProgressOverview, ProgressService, QuizHistoryItem};
pub use quiz::{QuizLoopService, SessionRegistry};
