//! 预约核心：会话状态机、预约账本、回复文本与每日日程

pub mod agenda;
pub mod format;
pub mod intent;
pub mod ledger;
pub mod router;
pub mod session;

pub use agenda::AgendaReporter;
pub use format::Replies;
pub use intent::{match_command, Command};
pub use ledger::{Booking, BookingLedger, MemoryLedger};
pub use router::{IntentRouter, TurnOutcome};
pub use session::{Draft, MemorySessionStore, Session, SessionStore, Step};
