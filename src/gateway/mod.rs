mod message;
mod socket;

pub use message::{Envelope, kind};
pub use socket::{SubscriptionId, ValidationGateway, ws_endpoint};
