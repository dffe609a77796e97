// Application layer - Use cases over the CrUX repository
pub mod crux_repository;
pub mod insights_service;
pub mod report;
