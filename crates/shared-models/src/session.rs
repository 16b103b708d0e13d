//! RPC-level session (C1). A session is minted on `initialize` and must be
//! presented on every subsequent call within its lifetime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub client_info: ClientInfo,
    pub protocol_version: String,
    pub creation_time: String,
    pub last_touched: String,
}
