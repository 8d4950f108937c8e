//! The length-prefixed envelope shared by the grade, file-share and chat directory labs.
//!
//! Every request and every reply on the wire has the same shape:
//!
//! ```text
//! -------------------------------------------------
//! | 1 byte tag | 8 byte BE length | ... payload ... |
//! -------------------------------------------------
//! ```
//!
//! For requests the tag is a command code chosen by each lab, for replies it is a [`Status`].

pub mod codec;
pub mod errors;
pub mod field;
pub mod message;
mod parser;

pub use codec::{EnvelopeCodec, ReplyCodec, RequestCodec};
pub use errors::WireError;
pub use message::{Envelope, Reply, Request, Status};
