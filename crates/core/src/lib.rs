pub mod config;
pub mod pattern;
pub mod remote;
pub mod retention;
pub mod testing;
pub mod transfer;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use pattern::{DateError, DateMatcher, DateTemplate};
pub use remote::{RemoteConnector, RemoteError, RemoteSession, SessionGuard, SftpConnector};
pub use retention::{RetentionDecision, SweepReport};
pub use transfer::{RunReport, TransferError, TransferOrchestrator, TransferTask};
