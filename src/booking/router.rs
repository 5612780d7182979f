//! 意图路由：单轮对话的状态机
//!
//! 进行中的预约流程（step ≠ Idle）优先于一切命令匹配：流程中输入 "prices" 也会被当作当前字段的值。
//! 同一用户的「读会话 → 状态转移 → 写账本 → 写回会话」在按用户加锁的临界区内完成，不同用户互不阻塞。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::format::{self, Replies};
use super::intent::{match_command, Command};
use super::ledger::{Booking, BookingLedger};
use super::session::{Session, SessionStore, Step};
use crate::gateway::{Delivery, InboundMessage, MessageGateway};

/// 一轮处理的结果
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    /// 本轮写回的会话
    pub session: Session,
    /// 本轮完成的预约（已追加到账本）
    pub booking: Option<Booking>,
}

/// 意图路由器（会话存储与账本由构造方注入）
pub struct IntentRouter {
    sessions: Arc<dyn SessionStore>,
    ledger: Arc<dyn BookingLedger>,
    replies: Replies,
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IntentRouter {
    pub fn new(sessions: Arc<dyn SessionStore>, ledger: Arc<dyn BookingLedger>, replies: Replies) -> Self {
        Self {
            sessions,
            ledger,
            replies,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn ledger(&self) -> &Arc<dyn BookingLedger> {
        &self.ledger
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// 处理一条入站消息；缺少发送者或正文为空时返回 None（不改状态、不回复）
    pub async fn handle_turn(&self, msg: &InboundMessage) -> Option<TurnOutcome> {
        let identity = msg.identity.trim();
        let body = msg.body.trim();
        if identity.is_empty() || body.is_empty() {
            tracing::debug!("Skipping inbound message without sender or body");
            return None;
        }

        let lock = self.turn_lock(identity).await;
        let _guard = lock.lock().await;

        let mut session = self.sessions.get(identity).await;
        let mut booking = None;

        let reply = if session.is_idle() {
            self.run_command(identity, &mut session, body).await
        } else {
            match session.fill(body) {
                Some(done) => {
                    let new_booking = Booking::new(
                        identity,
                        msg.name.clone().filter(|n| !n.trim().is_empty()),
                        done.date,
                        done.time,
                        done.service,
                        Utc::now(),
                    );
                    self.ledger.append(new_booking.clone()).await;
                    tracing::info!(
                        "Booking {} created for {} on {} at {}",
                        new_booking.id,
                        identity,
                        new_booking.date,
                        new_booking.time
                    );
                    let reply = format::confirmation(&new_booking);
                    booking = Some(new_booking);
                    reply
                }
                None => self.next_prompt(session.step()),
            }
        };

        self.sessions.set(identity, session.clone()).await;

        Some(TurnOutcome {
            reply,
            session,
            booking,
        })
    }

    /// 处理一轮并把回复发给发送者；发送失败只记录日志，已提交的会话与账本不回滚
    pub async fn handle_and_deliver(
        &self,
        gateway: &dyn MessageGateway,
        msg: &InboundMessage,
    ) -> Option<Delivery> {
        let outcome = self.handle_turn(msg).await?;
        let delivery = gateway.send(msg.identity.trim(), &outcome.reply).await;
        if let Delivery::Failed(reason) = &delivery {
            tracing::error!("Failed to send reply to {}: {}", msg.identity, reason);
        }
        Some(delivery)
    }

    async fn run_command(&self, identity: &str, session: &mut Session, body: &str) -> String {
        let command = match_command(body);
        tracing::debug!("Idle input from {} matched {:?}", identity, command);

        if command == Some(Command::Book) {
            session.start_booking();
            return format::DATE_PROMPT.to_string();
        }

        session.reset();
        match command {
            Some(Command::Menu) => self.replies.menu(),
            Some(Command::MyBookings) => {
                let bookings = self.ledger.for_client(identity).await;
                self.replies.my_bookings(&bookings)
            }
            Some(Command::Prices) => self.replies.prices(),
            Some(Command::Location) => self.replies.location(),
            Some(Command::Hours) => self.replies.hours(),
            Some(Command::Edits) => self.replies.edits(),
            Some(Command::Payment) => self.replies.payment(),
            Some(Command::Book) | None => self.replies.fallback(),
        }
    }

    fn next_prompt(&self, step: Step) -> String {
        match step {
            Step::AwaitingTime => format::TIME_PROMPT.to_string(),
            Step::AwaitingService => self.replies.service_prompt(),
            Step::AwaitingDate => format::DATE_PROMPT.to_string(),
            Step::Idle => self.replies.fallback(),
        }
    }

    async fn turn_lock(&self, identity: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        Arc::clone(locks.entry(identity.to_string()).or_default())
    }
}
