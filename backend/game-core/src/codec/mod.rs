//! Message codec for the game server's protobuf frames.
//!
//! Frames are encoded and decoded by the prost types generated from
//! `proto/server.proto`. Handlers address messages by name and exchange
//! [`Record`]s, so the engine stays independent of the generated structs.
//!
//! - [`MessageCodec::peek_type`] reads only the envelope discriminator
//! - [`MessageCodec::decode`] fully decodes a named message
//! - [`MessageCodec::encode`] verifies every field, then serializes

mod messages;
pub mod registry;
pub mod value;

pub use registry::{Registry, ServerMessage};
pub use value::{Record, Value};

use crate::error::codec::{DecodeError, EncodeError, SchemaError};
use crate::proto::SERVER_DESCRIPTOR_SET;
use crate::proto::server::{ClientAuth, MessageType, Profile, UuidValidation};

use messages::{FieldReader, RecordMessage};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, trace};
use prost::Message as ProstMessage;

/// Envelope message carrying only the discriminator.
pub const ENVELOPE_TYPE: &str = "MessageType";
/// Discriminator field, present at the same number in every message.
pub const ENVELOPE_TYPE_FIELD: &str = "type";
/// Server challenge (`type = 1`).
pub const CHALLENGE_REQUEST_TYPE: &str = "UUIDValidation";
/// Signed client acknowledgement (`type = 2`).
pub const AUTH_ACK_TYPE: &str = "ClientAuth";
/// Player profile (`type = 3`).
pub const PROFILE_TYPE: &str = "Profile";

const REQUIRED_TYPES: [&str; 4] = [ENVELOPE_TYPE, CHALLENGE_REQUEST_TYPE, AUTH_ACK_TYPE, PROFILE_TYPE];

/// Stateless encoder/decoder over a loaded schema registry.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    registry: Arc<Registry>,
}

impl MessageCodec {
    /// Wrap a registry, checking it declares every message the client exchanges.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingType`] if the envelope or an application message is absent.
    pub fn new(registry: Registry) -> Result<Self, SchemaError> {
        if let Some(missing) = REQUIRED_TYPES.into_iter().find(|name| !registry.contains(name)) {
            return Err(SchemaError::MissingType {
                type_name: missing.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    /// Codec over the schema compiled into this build.
    pub fn with_default_schema() -> Result<Self, SchemaError> {
        Self::new(Registry::load(SERVER_DESCRIPTOR_SET)?)
    }

    /// Read the discriminator of a frame.
    ///
    /// Returns `None` for malformed frames; never panics. A well-formed frame
    /// without the field reads as `Some(0)`, the proto3 default.
    pub fn peek_type(&self, frame: &[u8]) -> Option<i32> {
        match MessageType::decode(frame) {
            Ok(envelope) => Some(envelope.r#type),
            Err(e) => {
                trace!("Envelope peek failed on {} byte frame: {}", frame.len(), e);
                None
            }
        }
    }

    /// Fully decode `frame` as `type_name`.
    ///
    /// Unknown fields are skipped; declared fields missing from the frame get their
    /// proto3 default.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnknownType`] if `type_name` is not registered
    /// - [`DecodeError::Malformed`] if the bytes do not conform to the schema
    pub fn decode(&self, type_name: &str, frame: &[u8]) -> Result<Record, DecodeError> {
        let message = self
            .registry
            .get(type_name)
            .ok_or_else(|| DecodeError::unknown_type(type_name))?;

        match message {
            ServerMessage::MessageType => decode_record::<MessageType>(type_name, frame),
            ServerMessage::UuidValidation => decode_record::<UuidValidation>(type_name, frame),
            ServerMessage::ClientAuth => decode_record::<ClientAuth>(type_name, frame),
            ServerMessage::Profile => decode_record::<Profile>(type_name, frame),
        }
    }

    /// Verify `fields` against `type_name`, then serialize.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::UnknownType`] if `type_name` is not registered
    /// - [`EncodeError::Validation`] listing every field that failed; no bytes are produced
    pub fn encode(&self, type_name: &str, fields: &Record) -> Result<Vec<u8>, EncodeError> {
        let message = self
            .registry
            .get(type_name)
            .ok_or_else(|| EncodeError::unknown_type(type_name))?;

        let frame = match message {
            ServerMessage::MessageType => encode_record::<MessageType>(type_name, fields),
            ServerMessage::UuidValidation => encode_record::<UuidValidation>(type_name, fields),
            ServerMessage::ClientAuth => encode_record::<ClientAuth>(type_name, fields),
            ServerMessage::Profile => encode_record::<Profile>(type_name, fields),
        }?;

        debug!("Encoded {} ({} bytes)", message.proto_name(), frame.len());
        Ok(frame)
    }
}

fn decode_record<M: RecordMessage>(type_name: &str, frame: &[u8]) -> Result<Record, DecodeError> {
    M::decode(frame)
        .map(|message| message.to_record())
        .map_err(|e| DecodeError::malformed(type_name, e.to_string()))
}

fn encode_record<M: RecordMessage>(type_name: &str, fields: &Record) -> Result<Vec<u8>, EncodeError> {
    let mut reader = FieldReader::new(fields);
    let message = M::read_fields(&mut reader);

    let violations = reader.finish();
    if !violations.is_empty() {
        return Err(EncodeError::validation(type_name, violations));
    }

    Ok(message.encode_to_vec())
}
