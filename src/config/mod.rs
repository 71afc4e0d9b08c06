//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::DateConfig;
pub use site::SiteConfig;
pub use site::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
