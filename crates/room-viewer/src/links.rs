//! Opening clicked links in the system browser.

use anyhow::{bail, Context, Result};
use std::process::{Child, Command, Stdio};

/// Characters a command interpreter would treat as syntax.
const SHELL_META: &[char] = &['&', '|', '<', '>', '^', '"', '`'];

/// Accepts only absolute `http`/`https` URLs without whitespace, control
/// characters or shell syntax, so a room file cannot smuggle arguments or
/// commands into the opener.
pub fn validate_url(url: &str) -> Result<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .with_context(|| format!("refusing to open '{url}': only http(s) links are allowed"))?;
    if rest.is_empty() || rest.starts_with('/') {
        bail!("refusing to open '{url}': missing host");
    }
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        bail!("refusing to open '{url}': contains whitespace or control characters");
    }
    if url.contains(SHELL_META) {
        bail!("refusing to open '{url}': contains shell metacharacters");
    }
    if !percent_escapes_ok(url) {
        bail!("refusing to open '{url}': '%' must start a %XX escape");
    }
    Ok(url)
}

/// Every `%` must be followed by two hex digits (`%VAR%` is not a URL escape).
fn percent_escapes_ok(url: &str) -> bool {
    let bytes = url.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit()
            )
    })
}

fn opener(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        // Goes straight to the URL handler; no cmd.exe parses the argument.
        let mut cmd = Command::new("rundll32");
        cmd.arg("url.dll,FileProtocolHandler").arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Launches openers without blocking the frame loop and reaps them later.
#[derive(Debug, Default)]
pub struct Launcher {
    children: Vec<Child>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands `url` to the platform opener without waiting for it.
    pub fn open(&mut self, url: &str) -> Result<()> {
        let url = validate_url(url)?;
        let child = opener(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch a browser for {url}"))?;
        log::info!("Opened {url}");
        self.track(child);
        Ok(())
    }

    fn track(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Collects openers that have exited. Returns how many were collected.
    pub fn reap(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    log::warn!("link opener exited with {status}");
                }
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("could not poll link opener: {e}");
                false
            }
        });
        before - self.children.len()
    }

    /// Openers still running.
    pub fn pending(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_web_links() {
        assert!(validate_url("https://github.com/").is_ok());
        assert!(validate_url("http://example.com/a?b=c").is_ok());
        assert!(validate_url("https://example.com/caf%C3%A9").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_junk() {
        for bad in [
            "file:///etc/passwd",
            "javascript:alert(1)",
            "github.com",
            "https://",
            "https:///path",
            "https://example.com/ --flag",
            "https://example.com/\n",
            "https://example.com/&calc.exe",
            "https://example.com/a?b=1&c=2",
            "https://example.com/|whoami",
            "https://example.com/>out.txt",
            "https://example.com/\"x",
            "https://example.com/%PATH%",
            "https://example.com/%4",
        ] {
            assert!(validate_url(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn default_room_links_are_openable() {
        let cfg = crate::config::RoomConfig::default();
        for url in cfg
            .links
            .iter()
            .map(|l| &l.url)
            .chain(cfg.projects.iter().map(|p| &p.url))
        {
            assert!(validate_url(url).is_ok(), "{url}");
        }
    }

    #[test]
    fn launcher_refuses_invalid_links_without_spawning() {
        let mut launcher = Launcher::new();
        assert!(launcher.open("file:///etc/passwd").is_err());
        assert_eq!(launcher.pending(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn exited_openers_are_reaped() {
        let mut launcher = Launcher::new();
        launcher.track(Command::new("true").spawn().unwrap());
        assert_eq!(launcher.pending(), 1);

        let mut reaped = 0;
        for _ in 0..500 {
            reaped += launcher.reap();
            if launcher.pending() == 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(reaped, 1);
        assert_eq!(launcher.pending(), 0);
    }
}
