//! Schema-versioned binary codec for domain events.
//!
//! Wire format: one schema version byte followed by the protobuf encoding of
//! the event message. Consumers reject versions they do not know.

use prost::Message;
use uuid::Uuid;

use rocket_proto::v1::{OrderPaid, ShipAssembled};

/// Current schema version written by producers.
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("empty event payload")]
    Empty,

    #[error("unsupported event schema version {0}")]
    UnsupportedVersion(u8),

    #[error("failed to decode event body: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Encode a protobuf message with the version header.
pub fn encode<M: Message>(msg: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(msg.encoded_len() + 1);
    buf.push(SCHEMA_VERSION);
    msg.encode_raw(&mut buf);
    buf
}

/// Decode a versioned payload into a protobuf message.
pub fn decode<M: Message + Default>(bytes: &[u8]) -> Result<M, CodecError> {
    let (&version, body) = bytes.split_first().ok_or(CodecError::Empty)?;
    if version != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    Ok(M::decode(body)?)
}

fn uuid_field(value: &str, field: &'static str) -> Result<Uuid, CodecError> {
    Uuid::parse_str(value).map_err(|e| CodecError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

/// A typed domain event with a protobuf wire form.
pub trait DomainEvent: Sized {
    type Wire: Message + Default;

    fn to_wire(&self) -> Self::Wire;
    fn from_wire(wire: Self::Wire) -> Result<Self, CodecError>;

    /// Partition key; every event of one order lands on the same partition.
    fn partition_key(&self) -> String;

    fn encode(&self) -> Vec<u8> {
        encode(&self.to_wire())
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_wire(decode(bytes)?)
    }
}

/// Emitted after an order is durably marked paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaidEvent {
    pub event_uuid: Uuid,
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    pub payment_method: String,
    pub transaction_uuid: Uuid,
}

impl OrderPaidEvent {
    pub fn new(
        order_uuid: Uuid,
        user_uuid: Uuid,
        payment_method: impl Into<String>,
        transaction_uuid: Uuid,
    ) -> Self {
        Self {
            event_uuid: Uuid::new_v4(),
            order_uuid,
            user_uuid,
            payment_method: payment_method.into(),
            transaction_uuid,
        }
    }
}

impl DomainEvent for OrderPaidEvent {
    type Wire = OrderPaid;

    fn to_wire(&self) -> OrderPaid {
        OrderPaid {
            event_uuid: self.event_uuid.to_string(),
            order_uuid: self.order_uuid.to_string(),
            user_uuid: self.user_uuid.to_string(),
            payment_method: self.payment_method.clone(),
            transaction_uuid: self.transaction_uuid.to_string(),
        }
    }

    fn from_wire(wire: OrderPaid) -> Result<Self, CodecError> {
        Ok(Self {
            event_uuid: uuid_field(&wire.event_uuid, "event_uuid")?,
            order_uuid: uuid_field(&wire.order_uuid, "order_uuid")?,
            user_uuid: uuid_field(&wire.user_uuid, "user_uuid")?,
            payment_method: wire.payment_method,
            transaction_uuid: uuid_field(&wire.transaction_uuid, "transaction_uuid")?,
        })
    }

    fn partition_key(&self) -> String {
        self.order_uuid.to_string()
    }
}

/// Emitted by the assembly worker once the ship for an order is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipAssembledEvent {
    pub event_uuid: Uuid,
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    pub build_time_sec: i64,
}

impl ShipAssembledEvent {
    pub fn new(order_uuid: Uuid, user_uuid: Uuid, build_time_sec: i64) -> Self {
        Self {
            event_uuid: Uuid::new_v4(),
            order_uuid,
            user_uuid,
            build_time_sec,
        }
    }
}

impl DomainEvent for ShipAssembledEvent {
    type Wire = ShipAssembled;

    fn to_wire(&self) -> ShipAssembled {
        ShipAssembled {
            event_uuid: self.event_uuid.to_string(),
            order_uuid: self.order_uuid.to_string(),
            user_uuid: self.user_uuid.to_string(),
            build_time_sec: self.build_time_sec,
        }
    }

    fn from_wire(wire: ShipAssembled) -> Result<Self, CodecError> {
        if wire.build_time_sec < 0 {
            return Err(CodecError::InvalidField {
                field: "build_time_sec",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(Self {
            event_uuid: uuid_field(&wire.event_uuid, "event_uuid")?,
            order_uuid: uuid_field(&wire.order_uuid, "order_uuid")?,
            user_uuid: uuid_field(&wire.user_uuid, "user_uuid")?,
            build_time_sec: wire.build_time_sec,
        })
    }

    fn partition_key(&self) -> String {
        self.order_uuid.to_string()
    }
}
