//! Built-in credential sources, in default priority order.

pub mod container;
pub mod environment;
pub mod imds;
pub mod profile;

pub use container::ContainerSource;
pub use environment::EnvironmentSource;
pub use imds::InstanceMetadataSource;
pub use profile::ProfileFileSource;
