//! Schema registry: which `server` messages this build can exchange.
//!
//! The registry is loaded once from the descriptor set the build script writes
//! next to the generated types. Each declared message is bound to its generated
//! prost type, so a type name that resolves here always has a real encoder.

use crate::error::codec::SchemaError;

use std::collections::HashMap;

use log::{debug, info};
use prost::Message as ProstMessage;
use prost_types::FileDescriptorSet;

/// Package every server message is declared in.
pub const SERVER_PACKAGE: &str = "server";

/// Generated message types known to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerMessage {
    MessageType,
    UuidValidation,
    ClientAuth,
    Profile,
}

impl ServerMessage {
    const ALL: [ServerMessage; 4] = [
        ServerMessage::MessageType,
        ServerMessage::UuidValidation,
        ServerMessage::ClientAuth,
        ServerMessage::Profile,
    ];

    /// Name as declared in `server.proto`.
    pub fn proto_name(self) -> &'static str {
        match self {
            ServerMessage::MessageType => "MessageType",
            ServerMessage::UuidValidation => "UUIDValidation",
            ServerMessage::ClientAuth => "ClientAuth",
            ServerMessage::Profile => "Profile",
        }
    }

    fn from_proto_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|message| message.proto_name() == name)
    }
}

/// Immutable map from declared message name to generated type.
#[derive(Debug)]
pub struct Registry {
    messages: HashMap<String, ServerMessage>,
}

impl Registry {
    /// Parse an encoded `FileDescriptorSet` and bind its `server` messages.
    ///
    /// Messages without a generated type are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] if the bytes are not a descriptor set or it
    /// declares no message this build can encode.
    pub fn load(source: &[u8]) -> Result<Self, SchemaError> {
        let descriptor_set = FileDescriptorSet::decode(source)?;

        let mut messages = HashMap::new();
        for file in descriptor_set
            .file
            .iter()
            .filter(|file| file.package() == SERVER_PACKAGE)
        {
            for declared in &file.message_type {
                match ServerMessage::from_proto_name(declared.name()) {
                    Some(message) => {
                        messages.insert(message.proto_name().to_string(), message);
                    }
                    None => debug!(
                        "Skipping '{SERVER_PACKAGE}.{}': no generated type",
                        declared.name()
                    ),
                }
            }
        }

        if messages.is_empty() {
            return Err(SchemaError::parse(format!(
                "descriptor set declares no '{SERVER_PACKAGE}' messages"
            )));
        }

        info!("Schema registry loaded with {} message types", messages.len());
        Ok(Self { messages })
    }

    /// Look up a message by simple name (`Profile`) or full name (`server.Profile`).
    /// A leading dot is accepted.
    pub fn get(&self, name: &str) -> Option<ServerMessage> {
        let name = name.strip_prefix('.').unwrap_or(name);
        let simple = name
            .strip_prefix(SERVER_PACKAGE)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);

        self.messages.get(simple).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
