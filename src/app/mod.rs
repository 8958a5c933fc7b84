pub mod errors;
pub mod naming_service;
