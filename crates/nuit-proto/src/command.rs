//! Outbound chat commands.
//!
//! Each variant renders to exactly one wire line via [`fmt::Display`].
//! Channel arguments are given without the leading `#`.

use std::fmt;

/// A command the bot sends on the primary chat connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `CAP REQ :<cap1> <cap2> ...`
    CapReq(Vec<String>),
    /// `PASS oauth:<token>`
    Pass(String),
    /// `NICK <name>`
    Nick(String),
    /// `JOIN #<channel>`
    Join(String),
    /// `PONG` or `PONG <argument>` echoing the server's keepalive.
    Pong(Option<String>),
    /// `PRIVMSG #<channel> :<text>`
    Privmsg(String, String),
    /// `PART #<channel>`
    Part(String),
}

impl ChatCommand {
    /// Build the keepalive reply for a line, if the line is a `PING`.
    ///
    /// ```
    /// use nuit_proto::ChatCommand;
    ///
    /// let pong = ChatCommand::pong_for("PING :tmi.twitch.tv").unwrap();
    /// assert_eq!(pong.to_string(), "PONG :tmi.twitch.tv");
    /// assert!(ChatCommand::pong_for(":a!a@a PRIVMSG #c :PING").is_none());
    /// ```
    pub fn pong_for(line: &str) -> Option<Self> {
        let rest = line.trim_end_matches(['\r', '\n']).strip_prefix("PING")?;
        let argument = rest.trim();
        if argument.is_empty() {
            Some(Self::Pong(None))
        } else {
            Some(Self::Pong(Some(argument.to_owned())))
        }
    }

    /// Command verb, for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CapReq(_) => "CAP",
            Self::Pass(_) => "PASS",
            Self::Nick(_) => "NICK",
            Self::Join(_) => "JOIN",
            Self::Pong(_) => "PONG",
            Self::Privmsg(..) => "PRIVMSG",
            Self::Part(_) => "PART",
        }
    }
}

impl fmt::Display for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapReq(caps) => write!(f, "CAP REQ :{}", caps.join(" ")),
            Self::Pass(token) => write!(f, "PASS oauth:{token}"),
            Self::Nick(nick) => write!(f, "NICK {nick}"),
            Self::Join(channel) => write!(f, "JOIN #{channel}"),
            Self::Pong(None) => f.write_str("PONG"),
            Self::Pong(Some(argument)) => write!(f, "PONG {argument}"),
            Self::Privmsg(channel, text) => write!(f, "PRIVMSG #{channel} :{text}"),
            Self::Part(channel) => write!(f, "PART #{channel}"),
        }
    }
}
