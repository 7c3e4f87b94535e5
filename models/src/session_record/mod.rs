pub mod builder;

use crate::{Address, Signature};

use serde::{Deserialize, Serialize};

/// Wire discriminator of the `ClientAuth` acknowledgement.
pub const AUTH_ACK_MESSAGE_TYPE: i32 = 2;

/// A signed session, cached so later connections can skip the wallet prompt.
///
/// The JSON shape (`wallet`, `uuid`, `nonce`, `type`, `sign`) is also the field set
/// of the `ClientAuth` message, so the record maps one to one onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub wallet: Address,
    pub uuid: String,
    pub nonce: String,
    #[serde(rename = "type")]
    pub message_type: i32,
    pub sign: Signature,
}
