// Application layer - Use cases over the repository and alert source seams
pub mod alert_service;
pub mod alert_source;
pub mod fleet_service;
pub mod machine_repository;
pub mod machine_service;
pub mod refresh;
pub mod streaming_service;

#[cfg(test)]
pub mod test_support;
