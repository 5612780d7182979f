//! 命令识别
//!
//! Idle 状态下把用户输入映射到固定的命令集合。命令表按声明顺序匹配，第一个命中者胜出；
//! 模式之间并不互斥（"my bookings"、"cancel my booking" 都包含 "book"），所以顺序本身就是语义的一部分。

use std::sync::OnceLock;

use regex::Regex;

/// 独立命令（不进入多步流程，MyBookings/FAQ 处理完即回到 Idle）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Menu,
    Edits,
    MyBookings,
    Book,
    Prices,
    Location,
    Hours,
    Payment,
}

/// 有序命令表：(命令, 大小写不敏感的模式)
const COMMAND_PATTERNS: &[(Command, &str)] = &[
    (Command::Menu, r"(?i)^\s*(menu|start|hi|hello|hey|hola)\b"),
    (Command::Edits, r"(?i)\b(edit|change|reschedule|cancel|modify)"),
    (Command::MyBookings, r"(?i)\bmy\s*(bookings?|appointments?|reservations?)\b"),
    (Command::Book, r"(?i)\b(book|reserve|appointment|schedule)"),
    (Command::Prices, r"(?i)\b(price|pricing|prices|cost|rates?|packages?|how much)\b"),
    (Command::Location, r"(?i)\b(location|address|where|directions?|map)\b"),
    (Command::Hours, r"(?i)\b(hours|opening|open|close|closing|timings?)\b"),
    (Command::Payment, r"(?i)\b(pay|payment|deposit|card|cash|transfer)\b"),
];

static COMMAND_TABLE: OnceLock<Vec<(Command, Regex)>> = OnceLock::new();

fn command_table() -> &'static [(Command, Regex)] {
    COMMAND_TABLE.get_or_init(|| {
        COMMAND_PATTERNS
            .iter()
            .filter_map(|(cmd, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*cmd, re)),
                Err(e) => {
                    tracing::error!("Invalid command pattern for {:?}: {}", cmd, e);
                    None
                }
            })
            .collect()
    })
}

/// 识别命令；无命中返回 None（由调用方给出兜底帮助）
pub fn match_command(input: &str) -> Option<Command> {
    command_table()
        .iter()
        .find(|(_, re)| re.is_match(input))
        .map(|(cmd, _)| *cmd)
}
