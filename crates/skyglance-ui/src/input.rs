/// A user action typed on the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Refresh,
    Retry,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "refresh" => Some(Self::Refresh),
            "t" | "retry" | "try again" => Some(Self::Retry),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str = "Commands: [r]efresh, [t]ry again, [q]uit";
