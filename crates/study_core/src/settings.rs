use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

pub const DEFAULT_APP_TITLE: &str = "TaskScholar";
pub const DEFAULT_USER_NAME: &str = "Scholar";

/// Focus timer durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    #[serde(default = "default_focus")]
    pub focus: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
}

fn default_focus() -> u32 {
    DEFAULT_FOCUS_MINUTES
}

fn default_short_break() -> u32 {
    DEFAULT_SHORT_BREAK_MINUTES
}

fn default_long_break() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus: DEFAULT_FOCUS_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
        }
    }
}

impl TimerSettings {
    pub fn new(focus: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            focus,
            short_break,
            long_break,
        }
        .normalized()
    }

    /// Zero durations fall back to the default for that mode.
    #[must_use]
    pub fn normalized(self) -> Self {
        let or_default = |value: u32, default: u32| if value == 0 { default } else { value };
        Self {
            focus: or_default(self.focus, DEFAULT_FOCUS_MINUTES),
            short_break: or_default(self.short_break, DEFAULT_SHORT_BREAK_MINUTES),
            long_break: or_default(self.long_break, DEFAULT_LONG_BREAK_MINUTES),
        }
    }

    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }

    pub fn seconds_for(&self, mode: TimerMode) -> u32 {
        self.minutes_for(mode).saturating_mul(60)
    }
}

/// Single local profile shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub app_title: String,
    pub user_name: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            app_title: DEFAULT_APP_TITLE.to_string(),
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

impl Profile {
    pub fn set_app_title(&mut self, title: &str) {
        self.app_title = trimmed_or(title, DEFAULT_APP_TITLE);
    }

    pub fn set_user_name(&mut self, name: &str) {
        self.user_name = trimmed_or(name, DEFAULT_USER_NAME);
    }

    pub fn greeting(&self) -> String {
        format!("Welcome back, {}!", self.user_name)
    }
}

fn trimmed_or(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
