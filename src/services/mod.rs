pub mod conversion;
pub mod rate_cache;
pub mod rate_client;
pub mod rate_service;
