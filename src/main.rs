mod base32;
mod display;
mod scheduler;
mod share;
mod totp;

use std::env;

use crate::base32::base32_decode;
use crate::display::{Clipboard, ConsoleDisplay, DisplaySink, SystemClipboard};
use crate::scheduler::RefreshScheduler;
use crate::share::{key_from_url, share_url};
use crate::totp::Totp;

const DEFAULT_SHARE_BASE: &str = "https://totp.example/2fa";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = env::args().collect::<Vec<_>>();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "gen" => {
            let secret = match resolve_secret(args.get(2)) {
                Ok(secret) => secret,
                Err(err) => {
                    eprintln!("❌ {err}");
                    return Ok(());
                }
            };

            let totp = Totp::new(base32_decode(&secret));
            match totp.generate() {
                Ok(code) => {
                    let remaining = Totp::time_remaining()?;
                    println!("🔑 Code: {code}");
                    println!("Time remaining: {remaining}s");
                    println!("🔗 Share: {}", share_url(&share_base(), &secret)?);
                }
                Err(err) => println!("Error: {err}"),
            }
        }
        "copy" => {
            let secret = match resolve_secret(args.get(2)) {
                Ok(secret) => secret,
                Err(err) => {
                    eprintln!("❌ {err}");
                    return Ok(());
                }
            };

            let totp = Totp::new(base32_decode(&secret));
            let code = totp.generate()?;
            let remaining = Totp::time_remaining()?;

            let mut clipboard = SystemClipboard;
            match clipboard.copy(&code) {
                Ok(()) => println!("✅ Copied! TOTP code valid for {remaining} seconds"),
                Err(err) => {
                    // Both copy paths failed; leave the code on screen.
                    eprintln!("⚠️  Copy failed: {err}");
                    println!("🔑 Code: {code}");
                }
            }
        }
        "watch" => {
            let secret = match resolve_secret(args.get(2)) {
                Ok(secret) => secret,
                Err(err) => {
                    eprintln!("❌ {err}");
                    return Ok(());
                }
            };

            let mut display = ConsoleDisplay::new();
            display.set_share_link(&share_url(&share_base(), &secret)?);

            let mut scheduler = RefreshScheduler::new();
            scheduler.start(move || secret.clone(), display);

            tokio::signal::ctrl_c().await?;
            scheduler.stop();
            println!();
        }
        _ => {
            eprintln!("❌ Unknown command: {}", args[1]);
            print_usage();
        }
    }

    Ok(())
}

// The secret argument may be a raw base32 string or a share link
// carrying the secret in its `key` parameter.
fn resolve_secret(arg: Option<&String>) -> anyhow::Result<String> {
    let raw = arg.map(|s| s.trim()).unwrap_or("");

    if raw.is_empty() {
        anyhow::bail!("Please enter a secret key");
    }

    if let Some(key) = key_from_url(raw) {
        return Ok(key);
    }

    Ok(raw.to_string())
}

fn share_base() -> String {
    env::var("TOTP_SHARE_URL").unwrap_or_else(|_| DEFAULT_SHARE_BASE.to_string())
}

fn print_usage() {
    println!("🔐 TOTP Live Generator");
    println!("Usage: totp-live <command> <secret-or-share-url>");
    println!();
    println!("Commands:");
    println!("  gen <secret>                     Print the current TOTP code");
    println!("  copy <secret>                    Copy the current code to the clipboard");
    println!("  watch <secret>                   Live refresh mode (Ctrl+C to stop)");
    println!();
    println!("The secret is a base32 string; spaces and dashes are tolerated.");
    println!("A share link of the form <base>?key=<secret> is accepted anywhere");
    println!("a secret is. Set TOTP_SHARE_URL to change the share link base.");
    println!();
    println!("Examples:");
    println!("  totp-live gen JBSWY3DPEHPK3PXP");
    println!("  totp-live gen \"https://totp.example/2fa?key=JBSWY3DPEHPK3PXP\"");
    println!("  totp-live watch JBSWY3DPEHPK3PXP");
    println!("  totp-live copy JBSWY3DPEHPK3PXP");
}
