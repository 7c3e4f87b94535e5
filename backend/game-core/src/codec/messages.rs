//! Conversion between [`Record`]s and the generated `server` messages.
//!
//! Encoding reads every declared field out of the record through a
//! [`FieldReader`], which collects violations instead of stopping at the first,
//! then hands the typed message to prost.

use super::value::{Record, Value};
use crate::error::codec::{FieldViolation, ViolationReason};
use crate::proto::server::{ClientAuth, MessageType, Profile, UuidValidation};

use std::collections::BTreeSet;

const INT32: &str = "int32";
const STRING: &str = "string";

/// A generated message that can be built from and flattened into a [`Record`].
pub(crate) trait RecordMessage: prost::Message + Default {
    fn read_fields(reader: &mut FieldReader<'_>) -> Self;

    fn to_record(&self) -> Record;
}

/// Typed reads from a record, remembering which fields were consumed.
pub(crate) struct FieldReader<'a> {
    record: &'a Record,
    declared: BTreeSet<&'static str>,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(record: &'a Record) -> Self {
        Self {
            record,
            declared: BTreeSet::new(),
            violations: Vec::new(),
        }
    }

    /// Absent fields read as the proto3 default.
    fn int32(&mut self, field: &'static str) -> i32 {
        self.declared.insert(field);
        let record = self.record;
        match record.get(field) {
            None => 0,
            Some(Value::Int(value)) => i32::try_from(*value).unwrap_or_else(|_| {
                self.violate(field, ViolationReason::OutOfRange { expected: INT32 });
                0
            }),
            Some(other) => {
                self.violate(
                    field,
                    ViolationReason::TypeMismatch {
                        expected: INT32,
                        actual: other.kind_name(),
                    },
                );
                0
            }
        }
    }

    fn string(&mut self, field: &'static str) -> String {
        self.declared.insert(field);
        let record = self.record;
        match record.get(field) {
            None => String::new(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => {
                self.violate(
                    field,
                    ViolationReason::TypeMismatch {
                        expected: STRING,
                        actual: other.kind_name(),
                    },
                );
                String::new()
            }
        }
    }

    fn violate(&mut self, field: &str, reason: ViolationReason) {
        self.violations.push(FieldViolation::new(field, reason));
    }

    /// Violations so far, plus one for every record field the message does not declare.
    pub(crate) fn finish(mut self) -> Vec<FieldViolation> {
        let undeclared: Vec<String> = self
            .record
            .field_names()
            .filter(|name| !self.declared.contains(name))
            .map(str::to_string)
            .collect();

        for field in undeclared {
            self.violate(&field, ViolationReason::UnknownField);
        }
        self.violations
    }
}

impl RecordMessage for MessageType {
    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            r#type: reader.int32("type"),
        }
    }

    fn to_record(&self) -> Record {
        Record::new().with("type", self.r#type)
    }
}

impl RecordMessage for UuidValidation {
    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            r#type: reader.int32("type"),
            uuid: reader.string("uuid"),
        }
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("type", self.r#type)
            .with("uuid", self.uuid.as_str())
    }
}

impl RecordMessage for ClientAuth {
    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            r#type: reader.int32("type"),
            wallet: reader.string("wallet"),
            uuid: reader.string("uuid"),
            nonce: reader.string("nonce"),
            sign: reader.string("sign"),
        }
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("type", self.r#type)
            .with("wallet", self.wallet.as_str())
            .with("uuid", self.uuid.as_str())
            .with("nonce", self.nonce.as_str())
            .with("sign", self.sign.as_str())
    }
}

impl RecordMessage for Profile {
    fn read_fields(reader: &mut FieldReader<'_>) -> Self {
        Self {
            r#type: reader.int32("type"),
            energies: reader.int32("energies"),
        }
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("type", self.r#type)
            .with("energies", self.energies)
    }
}
