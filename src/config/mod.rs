//! Configuration module

mod site;

pub use site::DatabaseConfig;
pub use site::HighlightConfig;
pub use site::PreviewConfig;
pub use site::ServerConfig;
pub use site::SessionConfig;
pub use site::SiteConfig;
