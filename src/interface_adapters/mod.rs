// Interface adapters layer: translation between the network and use cases.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
