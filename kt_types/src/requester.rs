use std::fmt;

/// Identity of whoever issued a command and receives its replies
///
/// For Telegram this is the private chat id, which equals the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Requester(pub i64);

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
