//! Authoritative server for a two-player naval duel on destructible
//! tile platforms. Layered clean-architecture style: domain rules,
//! session use cases, network adapters, then the runtime frame.

pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::http_port;
pub use frameworks::server::run;
