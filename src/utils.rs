use std::fmt;

use chrono::{Datelike, Local, Timelike};

/// 文件创建、修改时间
///
/// 两个时间戳仅在所有字段完全一致时相等。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hour: u32,
    pub minute: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02} {:02}.{:02}.{}",
            self.hour, self.minute, self.day, self.month, self.year
        )
    }
}

/// 时间来源
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// 读取本地时间
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> Timestamp {
        let now = Local::now();
        Timestamp {
            hour: now.hour(),
            minute: now.minute(),
            day: now.day(),
            month: now.month(),
            year: now.year(),
        }
    }
}
