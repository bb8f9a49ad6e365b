// Resume storage, enrichment and CRUD.
// Handlers stay thin; flows live on `ResumeService`.

pub mod handlers;
pub mod repository;
pub mod service;
pub mod upload;
