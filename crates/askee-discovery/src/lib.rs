pub mod error;
pub mod invitation;
pub mod store;
pub mod transport;

pub use error::DiscoveryError;
pub use invitation::{decode_signal, encode_signal, Channel, DiscoverySignalPayload, VerifiedInvitation};
pub use store::InvitationStore;
pub use transport::DiscoveryTransport;
