// Interface adapters: HTTP gateway, wire protocol and ingress normalization.

pub mod gateway;
pub mod normalize;
pub mod protocol;

pub use gateway::{ApiGateway, GatewayBuildError};
