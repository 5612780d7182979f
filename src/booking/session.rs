//! 会话存储
//!
//! 每个用户（WhatsApp 号码）一份对话状态：当前步骤 + 预约草稿。
//! `get` 不写入；调用方处理完一轮后用 `set` 显式写回。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// 预约流程所处的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Idle,
    AwaitingDate,
    AwaitingTime,
    AwaitingService,
}

/// 预约草稿：按 date → time → service 顺序填充
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub date: Option<String>,
    pub time: Option<String>,
    pub service: Option<String>,
}

/// 草稿填满后的三个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedDraft {
    pub date: String,
    pub time: String,
    pub service: String,
}

/// 单个用户的对话状态
///
/// 字段只通过下面的方法修改，保证 `step` 与草稿已填字段数一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    step: Step,
    draft: Draft,
}

impl Session {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_idle(&self) -> bool {
        self.step == Step::Idle
    }

    /// 开始预约流程：清空草稿，等待日期
    pub fn start_booking(&mut self) {
        self.draft = Draft::default();
        self.step = Step::AwaitingDate;
    }

    /// 把本轮输入写入当前步骤对应的字段并前进一步
    ///
    /// 填满 service 时返回完整草稿并回到 Idle；Idle 状态下调用不做任何事。
    pub fn fill(&mut self, value: &str) -> Option<CompletedDraft> {
        match self.step {
            Step::Idle => None,
            Step::AwaitingDate => {
                self.draft.date = Some(value.to_string());
                self.step = Step::AwaitingTime;
                None
            }
            Step::AwaitingTime => {
                self.draft.time = Some(value.to_string());
                self.step = Step::AwaitingService;
                None
            }
            Step::AwaitingService => {
                let draft = std::mem::take(&mut self.draft);
                self.step = Step::Idle;
                Some(CompletedDraft {
                    date: draft.date.unwrap_or_default(),
                    time: draft.time.unwrap_or_default(),
                    service: value.to_string(),
                })
            }
        }
    }

    /// 回到 `{Idle, {}}`
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

/// 会话存储接口（可替换为持久化实现）
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 取用户会话；不存在时返回新的 Idle 会话，但不写入
    async fn get(&self, identity: &str) -> Session;

    /// 替换用户会话
    async fn set(&self, identity: &str, session: Session);

    /// 已保存的会话数
    async fn len(&self) -> usize;
}

/// 内存会话存储
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, identity: &str) -> Session {
        self.sessions
            .read()
            .await
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    async fn set(&self, identity: &str, session: Session) {
        self.sessions
            .write()
            .await
            .insert(identity.to_string(), session);
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
