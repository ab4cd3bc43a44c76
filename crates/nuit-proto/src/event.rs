//! Chat events parsed from raw wire lines.
//!
//! The chat feed delivers lines of the form
//!
//! ```text
//! @badge-info=;display-name=Foo;mod=0 :foo!foo@foo.tmi.twitch.tv PRIVMSG #chan :hello there
//! ```
//!
//! Only `PRIVMSG` lines become a [`ChatEvent`]. Keepalive `PING` lines are
//! recognised by the caller before parsing is attempted.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Separator between the sender prefix and the channel/message part.
const PRIVMSG_SEPARATOR: &str = " PRIVMSG ";

/// Separator between the channel and the trailing message text.
const TRAILING_SEPARATOR: &str = " :";

/// Tag carrying the sender's human-readable name.
pub const DISPLAY_NAME_TAG: &str = "display-name";

/// A single chat message received on a channel.
///
/// Values are immutable once parsed; use [`parse`] or [`str::parse`] to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    tags: HashMap<String, String>,
    channel: String,
    user: String,
    message: String,
}

impl ChatEvent {
    /// Message tags (`key=value` pairs from the leading `@` block).
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Look up a single tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Channel name without the leading `#`.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Sender login taken from the prefix, never from tags.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Trailing message text, trimmed of surrounding whitespace.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Preferred human-readable sender name.
    ///
    /// Returns the `display-name` tag when present and non-empty, otherwise
    /// the prefix login.
    pub fn display_name(&self) -> &str {
        match self.tag(DISPLAY_NAME_TAG) {
            Some(name) if !name.is_empty() => name,
            _ => &self.user,
        }
    }
}

impl fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}] {}: {}", self.channel, self.display_name(), self.message)
    }
}

impl FromStr for ChatEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a raw chat line into a [`ChatEvent`].
///
/// Fails atomically: either every field is filled or an error is returned.
/// Only the first ` PRIVMSG ` and the first ` :` after it are treated as
/// separators, so message bodies may contain either sequence.
pub fn parse(line: &str) -> Result<ChatEvent, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (tags, rest) = match line.strip_prefix('@') {
        Some(tagged) => {
            let (tags_part, rest) = tagged.split_once(' ').ok_or(ParseError::MalformedTags)?;
            (parse_tags(tags_part), rest)
        }
        None => (HashMap::new(), line),
    };

    let (prefix, target_part) = rest
        .split_once(PRIVMSG_SEPARATOR)
        .ok_or(ParseError::NotPrivmsg)?;

    let source = prefix.strip_prefix(':').ok_or(ParseError::MissingPrefix)?;
    let user = source.split('!').next().unwrap_or(source);

    let (channel_part, message) = target_part
        .split_once(TRAILING_SEPARATOR)
        .ok_or(ParseError::MissingChannel)?;
    let channel = channel_part.strip_prefix('#').unwrap_or(channel_part);

    Ok(ChatEvent {
        tags,
        channel: channel.to_owned(),
        user: user.to_owned(),
        message: message.trim().to_owned(),
    })
}

/// Split a tag block on `;`, then each segment on its first `=`.
///
/// Segments without `=` are dropped.
fn parse_tags(tags_part: &str) -> HashMap<String, String> {
    tags_part
        .split(';')
        .filter_map(|segment| segment.split_once('='))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
