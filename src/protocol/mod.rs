//! Protocol module
//!
//! Message shapes exchanged between nodes and the signed-message response
//! protocol built on them.
//!
//! A message moves through a fixed sequence of forms:
//!
//! ```text
//! PlainMessage --Router::send--> EncryptedMessage --Router::open--> body
//! body --Node::sign_message--> SignedMessage --ResponseProtocol::respond--> ResponseMessage
//! ```

pub mod messages;
pub mod response;

pub use messages::{EncryptedMessage, Message, PlainMessage, ResponseMessage, SignedMessage};
pub use response::ResponseProtocol;
