pub mod key;
pub mod node;
pub mod signer;
pub mod tx;
