//! Frame types: one operation kind plus an optional envelope

use fiap_core::Transport;
use serde::{Deserialize, Serialize};

/// The two FIAP operations. `query` carries pull requests and
/// subscription registrations; `data` carries writes and pushed bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Query,
    Data,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Query => f.write_str("query"),
            Op::Data => f.write_str("data"),
        }
    }
}

/// One wire message. The transport is optional on purpose: a request
/// without an envelope is representable and is rejected by the inbound
/// dispatcher, not by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub op: Op,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

impl Frame {
    pub fn new(op: Op, transport: Transport) -> Self {
        Self {
            op,
            transport: Some(transport),
        }
    }
}
