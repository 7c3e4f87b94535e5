// Game server protocol (package: server)
// Contains: MessageType, UUIDValidation, ClientAuth, Profile
pub mod server {
    include!(concat!(env!("OUT_DIR"), "/server.rs"));
}

/// Encoded `FileDescriptorSet` for `proto/server.proto`, the default schema source.
pub const SERVER_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/server_descriptor.bin"));
