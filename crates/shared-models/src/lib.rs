//! Data structures shared across every service in the control plane.
//!
//! This crate is the ONLY local dependency every other crate is allowed to
//! take, a single foundation crate of shared wire types: entities here are
//! produced-and-returned values, never shared mutable state. Ownership of
//! the few entities that genuinely are mutable state (`Portfolio`, the
//! `Alert` table, the audit log) stays with their single owning service;
//! this crate only defines their shape.

pub mod alert;
pub mod audit;
pub mod ids;
pub mod market;
pub mod notification;
pub mod policy;
pub mod portfolio;
pub mod ports;
pub mod session;
pub mod severity;
pub mod signal;
pub mod time;
pub mod trade;

pub use alert::{Alert, AlertCondition};
pub use audit::{format_event_id, AuditEvent, EventType};
pub use ids::hex_token;
pub use market::{Candle, Interval, Quote};
pub use notification::NotificationRecord;
pub use policy::RiskPolicy;
pub use portfolio::{Portfolio, Position, TransactionRecord};
pub use session::{ClientInfo, Session};
pub use severity::Severity;
pub use signal::{Signal, Verdict};
pub use trade::{Change, RebalanceProposal, RiskVerdict, TradeAction, TradeProposal};
