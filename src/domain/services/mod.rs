pub mod session_service;
pub mod capacity;
pub mod cleanup;
