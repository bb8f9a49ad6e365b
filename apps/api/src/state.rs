use crate::resumes::service::ResumeService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume flows over the record store, object storage and analysis service.
    pub resumes: ResumeService,
}
