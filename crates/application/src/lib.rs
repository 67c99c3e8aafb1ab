//! Application services and ports.

#![forbid(unsafe_code)]

mod connector_service;
mod gateway_ports;

pub use connector_service::ConnectorService;
pub use gateway_ports::{CreateAccountInput, OutputSink, PamGateway};
