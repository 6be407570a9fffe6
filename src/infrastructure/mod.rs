// Infrastructure layer - External dependencies and adapters
pub mod alert_fixtures;
pub mod chunked_json;
pub mod config;
pub mod envelope;
pub mod http_response;
pub mod rest_repository;
pub mod wire;
