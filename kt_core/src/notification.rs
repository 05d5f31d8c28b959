use kt_types::Requester;

/// Asynchronous message produced by the order monitor, addressed to the
/// requester who placed the order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub recipient: Requester,
    pub text: String,
}

impl Notification {
    pub fn new(recipient: Requester, text: impl Into<String>) -> Self {
        Self { recipient, text: text.into() }
    }
}
