//! Wire types of the Instana configuration API

mod alerting_channel;
mod alerting_config;
mod sli_config;
mod website_monitoring;

pub use alerting_channel::*;
pub use alerting_config::*;
pub use sli_config::*;
pub use website_monitoring::*;
