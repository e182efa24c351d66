/// Inbound event routing.
pub mod dispatch;
/// Background hint reveals and round expiry.
pub mod hint_scheduler;
/// Outbound messaging contract and broadcast implementation.
pub mod notifier;
/// Round controller operations.
pub mod round_service;
