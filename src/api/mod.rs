//! This mod is meant to hold most of the code for the library's client-facing API.
mod client;
mod config_check;
mod connector;
mod event_bus;
mod options;
mod wiring;

pub use client::Broker;
pub use client::HelloError;
pub use client::LocalChangeError;
pub use client::ReconfigureError;
pub use config_check::ConfigChangeResult;
pub use config_check::ConfigErrorHandler;
pub use config_check::ConfigPhase;
pub use config_check::ResultCode;
pub use connector::ConnectError;
pub use connector::Connector;
pub use event_bus::BrokerEvent;
pub use event_bus::BrokerEventListener;
pub use options::BrokerOptions;
pub use wiring::try_create_broker;
pub use wiring::BrokerConfig;
pub use wiring::BrokerCreationError;

// So the broker runtime can take validated options.
pub(crate) use options::BrokerOptionsValidated;
