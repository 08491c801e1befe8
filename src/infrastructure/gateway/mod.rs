//! WebSocket subscription gateway

pub mod subscription_gateway;

pub use subscription_gateway::SubscriptionGateway;
