pub mod multipart_form;
pub mod notifier;
pub mod patient_service;
pub mod session_service;
pub mod upload_store;
