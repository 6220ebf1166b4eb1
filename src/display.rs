use base64::Engine as _;
use std::env;
use std::io::Write as _;

// Display and clipboard are injected capabilities so the generation
// pipeline never touches a terminal directly.
pub trait DisplaySink {
    fn set_code(&mut self, code: &str);
    fn set_timer(&mut self, remaining: u64);
    fn set_share_link(&mut self, url: &str);
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> anyhow::Result<()>;
}

// Terminal renderer for live mode
pub struct ConsoleDisplay {
    code: String,
    remaining: u64,
    share_link: Option<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            code: String::new(),
            remaining: 0,
            share_link: None,
        }
    }

    fn redraw(&self) {
        // Clear screen
        print!("\x1B[2J\x1B[1;1H");

        println!("🔄 Live TOTP - {}", chrono::Utc::now().format("%H:%M:%S"));
        println!("==========================================");
        println!("🔑 Code: {}", self.code);

        let remaining_string = if env::var("NO_COLOR").is_ok() || self.remaining > 5 {
            format!("{}s", self.remaining)
        } else {
            format!("\x1b[31m{}s\x1b[0m", self.remaining) // Red color for low time
        };
        println!("Time remaining: {}", remaining_string);

        if let Some(link) = &self.share_link {
            println!("🔗 Share: {}", link);
        }

        println!("\nPress Ctrl+C to exit live mode");
        std::io::stdout().flush().ok();
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for ConsoleDisplay {
    fn set_code(&mut self, code: &str) {
        self.code = code.to_string();
        self.redraw();
    }

    fn set_timer(&mut self, remaining: u64) {
        self.remaining = remaining;
        self.redraw();
    }

    fn set_share_link(&mut self, url: &str) {
        self.share_link = Some(url.to_string());
    }
}

// System clipboard with an OSC 52 escape-sequence fallback for terminals
// where no native clipboard is reachable (SSH sessions, headless hosts).
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> anyhow::Result<()> {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => Ok(()),
            Err(err) => {
                eprintln!("⚠️  System clipboard unavailable ({err}), trying OSC 52");
                osc52_copy(text)
            }
        }
    }
}

fn osc52_copy(text: &str) -> anyhow::Result<()> {
    let payload = base64::engine::general_purpose::STANDARD.encode(text);
    let mut stdout = std::io::stdout();
    write!(stdout, "\x1b]52;c;{}\x07", payload)?;
    stdout.flush()?;
    Ok(())
}
