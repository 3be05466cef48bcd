//! Inbound line classification.
//!
//! The dispatcher reacts to exactly two shapes of server output: PING
//! requests (which must be answered promptly to keep the connection alive)
//! and numeric replies (the signal that registration completed). Everything
//! else is ignored.

/// Classification of a single inbound server line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// `PING <args>` — the argument is carried verbatim so the PONG reply
    /// can echo it unchanged.
    Ping(String),
    /// `:<prefix> <3-digit-code> ...` — a numeric reply with its code.
    Numeric(u16),
    /// Any other line.
    Other,
}

impl ServerLine {
    /// Classify one inbound line. Trailing CR/LF is tolerated.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(args) = line.strip_prefix("PING ") {
            return Self::Ping(args.to_string());
        }

        if let Some(rest) = line.strip_prefix(':') {
            let mut words = rest.split(' ');
            let prefix = words.next().unwrap_or("");
            if let Some(code) = words.next() {
                if !prefix.is_empty()
                    && code.len() == 3
                    && code.bytes().all(|b| b.is_ascii_digit())
                {
                    return Self::Numeric(code.parse().unwrap_or(0));
                }
            }
        }

        Self::Other
    }
}
