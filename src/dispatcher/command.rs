use std::fmt;

/// Literal prefix shared by every recognised command.
pub const COMMAND_PREFIX: &str = "/minecraft";

/// One of the four chat commands. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Status,
    Ip,
    Start,
    Stop,
}

impl Command {
    pub const ALL: [Command; 4] = [Self::Status, Self::Ip, Self::Start, Self::Stop];

    /// Parses a whole message body. Anything other than an exact command yields `None`.
    pub fn parse(content: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.literal() == content)
    }

    /// Exact text a user types to issue the command.
    pub const fn literal(self) -> &'static str {
        match self {
            Self::Status => "/minecraft status",
            Self::Ip => "/minecraft ip",
            Self::Start => "/minecraft start",
            Self::Stop => "/minecraft stop",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Ip => "ip",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
