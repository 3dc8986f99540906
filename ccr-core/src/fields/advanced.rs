//! Advanced replication settings
//!
//! Optional tuning parameters for a follower index. Every setting may be left
//! empty, in which case the cluster applies its own default.

use super::registry::{FieldDefinition, FieldKind};
use super::{FieldError, FieldId};
use once_cell::sync::Lazy;
use regex::Regex;

static BYTE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+(\.\d+)?(b|kb|mb|gb|tb|pb)$").expect("byte size pattern is valid")
});

static TIME_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(d|h|m|s|ms|micros|nanos)$").expect("time value pattern is valid")
});

pub static ADVANCED_SETTINGS: [FieldDefinition; 10] = [
    FieldDefinition {
        id: FieldId::MaxReadRequestOperationCount,
        label: "Max read request operation count",
        description: "The maximum number of operations to pull per read from the remote cluster.",
        default_value: Some("5120"),
        kind: FieldKind::Number,
        validator: Some(validate_count),
    },
    FieldDefinition {
        id: FieldId::MaxOutstandingReadRequests,
        label: "Max outstanding read requests",
        description: "The maximum number of outstanding read requests from the remote cluster.",
        default_value: Some("12"),
        kind: FieldKind::Number,
        validator: Some(validate_count),
    },
    FieldDefinition {
        id: FieldId::MaxReadRequestSize,
        label: "Max read request size",
        description: "The maximum size in bytes of per read of a batch of operations pulled from the remote cluster.",
        default_value: Some("32mb"),
        kind: FieldKind::ByteSize,
        validator: Some(validate_byte_size),
    },
    FieldDefinition {
        id: FieldId::MaxWriteRequestOperationCount,
        label: "Max write request operation count",
        description: "The maximum number of operations per bulk write request executed on the follower.",
        default_value: Some("5120"),
        kind: FieldKind::Number,
        validator: Some(validate_count),
    },
    FieldDefinition {
        id: FieldId::MaxWriteRequestSize,
        label: "Max write request size",
        description: "The maximum total bytes of operations per bulk write request executed on the follower.",
        default_value: Some("9223372036854775807b"),
        kind: FieldKind::ByteSize,
        validator: Some(validate_byte_size),
    },
    FieldDefinition {
        id: FieldId::MaxOutstandingWriteRequests,
        label: "Max outstanding write requests",
        description: "The maximum number of outstanding write requests on the follower.",
        default_value: Some("9"),
        kind: FieldKind::Number,
        validator: Some(validate_count),
    },
    FieldDefinition {
        id: FieldId::MaxWriteBufferCount,
        label: "Max write buffer count",
        description: "The maximum number of operations that can be queued for writing. When this limit is reached, reads from the remote cluster are deferred until the number of queued operations goes below the limit.",
        default_value: Some("2147483647"),
        kind: FieldKind::Number,
        validator: Some(validate_count),
    },
    FieldDefinition {
        id: FieldId::MaxWriteBufferSize,
        label: "Max write buffer size",
        description: "The maximum total bytes of operations that can be queued for writing. When this limit is reached, reads from the remote cluster are deferred until the total bytes of queued operations goes below the limit.",
        default_value: Some("512mb"),
        kind: FieldKind::ByteSize,
        validator: Some(validate_byte_size),
    },
    FieldDefinition {
        id: FieldId::MaxRetryDelay,
        label: "Max retry delay",
        description: "The maximum time to wait before retrying an operation that failed exceptionally. Retries use exponential backoff.",
        default_value: Some("500ms"),
        kind: FieldKind::TimeValue,
        validator: Some(validate_time_value),
    },
    FieldDefinition {
        id: FieldId::ReadPollTimeout,
        label: "Read poll timeout",
        description: "The maximum time to wait for new operations on the remote cluster when the follower index is synchronized with the leader index. When the timeout elapses the poll returns to the follower so it can update statistics, then reads from the leader again.",
        default_value: Some("1m"),
        kind: FieldKind::TimeValue,
        validator: Some(validate_time_value),
    },
];

pub fn validate_count(value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => None,
        Ok(_) => Some(FieldError::new("Must be greater than 0.")),
        Err(_) => Some(FieldError::new("Must be a whole number.")),
    }
}

pub fn validate_byte_size(value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() || BYTE_SIZE.is_match(value) {
        return None;
    }
    Some(FieldError::new(
        "Must be a size with a unit (b, kb, mb, gb, tb or pb), for example 512mb.",
    ))
}

pub fn validate_time_value(value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() || TIME_VALUE.is_match(value) {
        return None;
    }
    Some(FieldError::new(
        "Must be a duration with a unit (d, h, m, s, ms, micros or nanos), for example 30s.",
    ))
}
