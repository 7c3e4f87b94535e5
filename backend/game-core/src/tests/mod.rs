mod engine;

use models::{Address, AuthChallenge, SessionRecord, SessionRecordBuilder, Signature};
use prost::Message as ProstMessage;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};

pub(crate) const TEST_WALLET: &str = "0x529bF1e30E1b5D2dC53e4bB0F29f8E5d3A0c9EE7";

pub(crate) fn test_wallet() -> Address {
    Address::parse(TEST_WALLET).expect("valid test wallet")
}

pub(crate) fn signed_record(uuid: &str, nonce: &str) -> SessionRecord {
    let challenge = AuthChallenge::new(test_wallet(), uuid, nonce);
    SessionRecordBuilder::default()
        .with_challenge(&challenge)
        .with_signature(Signature::new("0xcafebabe").expect("non-empty"))
        .build()
        .expect("valid record")
}

pub(crate) fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        r#type: Some(ty as i32),
        label: Some(Label::Optional as i32),
        ..Default::default()
    }
}

pub(crate) fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

/// The four messages the client exchanges, as declared in `proto/server.proto`.
pub(crate) fn server_messages() -> Vec<DescriptorProto> {
    vec![
        message("MessageType", vec![field("type", 1, Type::Int32)]),
        message(
            "UUIDValidation",
            vec![field("type", 1, Type::Int32), field("uuid", 2, Type::String)],
        ),
        message(
            "ClientAuth",
            vec![
                field("type", 1, Type::Int32),
                field("wallet", 2, Type::String),
                field("uuid", 3, Type::String),
                field("nonce", 4, Type::String),
                field("sign", 5, Type::String),
            ],
        ),
        message(
            "Profile",
            vec![field("type", 1, Type::Int32), field("energies", 2, Type::Int32)],
        ),
    ]
}

/// Encoded descriptor set with one file in `package`.
pub(crate) fn descriptor_set(package: &str, messages: Vec<DescriptorProto>) -> Vec<u8> {
    FileDescriptorSet {
        file: vec![FileDescriptorProto {
            name: Some(format!("{package}.proto")),
            package: Some(package.to_string()),
            message_type: messages,
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }],
    }
    .encode_to_vec()
}
