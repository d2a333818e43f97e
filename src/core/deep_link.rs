//! Outbound WhatsApp deep links and the hook that opens them.

use std::process::Command;

use crate::errors::{FunnelError, Result};

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Percent-encodes text the way browsers' `encodeURIComponent` does.
///
/// Unreserved characters are `A-Z a-z 0-9 - _ . ! ~ * ' ( )`; every other
/// UTF-8 byte becomes `%XX` with uppercase hex.
pub fn encode_uri_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.as_bytes() {
        let ch = *byte as char;
        let unreserved = ch.is_ascii_alphanumeric()
            || matches!(ch, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')');
        if unreserved {
            out.push(ch);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Builds `https://wa.me/<number>?text=<encoded message>`.
///
/// The number may be written with `+`, spaces, or dashes; only digits are kept.
pub fn whatsapp_url(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("{WHATSAPP_BASE}{digits}?text={}", encode_uri_component(message))
}

/// Hands a URL to whatever should display it.
pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens links with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };
        let status = command.arg(url).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(FunnelError::External(format!("link opener exited with {status}")))
        }
    }
}

/// Leaves links untouched; used headless and under scripted tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLinkOpener;

impl LinkOpener for NoopLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        tracing::debug!(%url, "link opening disabled");
        Ok(())
    }
}

/// Attempts to open a link, logging instead of propagating failures.
pub fn open_best_effort(opener: &dyn LinkOpener, url: &str) -> bool {
    match opener.open(url) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to open WhatsApp link");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_uri_component("Hi!"), "Hi!");
        assert_eq!(encode_uri_component("a b\nc"), "a%20b%0Ac");
        assert_eq!(encode_uri_component("*BMW* (M3)"), "*BMW*%20(M3)");
        assert_eq!(encode_uri_component("I'm ~ok~"), "I'm%20~ok~");
        assert_eq!(encode_uri_component("a+b&c=d?/#"), "a%2Bb%26c%3Dd%3F%2F%23");
        assert_eq!(encode_uri_component("•"), "%E2%80%A2");
    }

    #[test]
    fn whatsapp_url_keeps_only_digits_in_number() {
        assert_eq!(
            whatsapp_url("+971 56 719 1045", "Hi there"),
            "https://wa.me/971567191045?text=Hi%20there"
        );
    }

    #[test]
    fn noop_opener_always_succeeds() {
        assert!(open_best_effort(&NoopLinkOpener, "https://wa.me/1"));
    }
}
