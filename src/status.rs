//! Colored status lines for the invoking terminal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Info,
    Warn,
    Error,
}

impl Tone {
    fn sgr(self) -> &'static str {
        match self {
            Tone::Ok => "32",
            Tone::Info => "36",
            Tone::Warn => "33",
            Tone::Error => "31",
        }
    }
}

pub fn paint(tone: Tone, msg: &str) -> String {
    format!("\u{1b}[{}m{msg}\u{1b}[0m", tone.sgr())
}

pub fn ok(msg: &str) {
    println!("{}", paint(Tone::Ok, msg));
}

pub fn info(msg: &str) {
    println!("{}", paint(Tone::Info, msg));
}

pub fn warn(msg: &str) {
    println!("{}", paint(Tone::Warn, msg));
}

pub fn error(msg: &str) {
    eprintln!("{}", paint(Tone::Error, msg));
}
