use kt_types::Requester;
use teloxide::types::CallbackQuery;
use teloxide::types::ChatId;
use teloxide::types::Message;
use teloxide::types::UserId;

/// Messages are attributed to their chat; in a private chat that is the user id
pub fn message_requester(msg: &Message) -> Requester {
    chat_requester(msg.chat.id)
}

/// Button presses are attributed to the pressing user
pub fn callback_requester(query: &CallbackQuery) -> Option<Requester> {
    user_requester(query.from.id)
}

pub fn chat_requester(chat_id: ChatId) -> Requester {
    Requester(chat_id.0)
}

pub fn user_requester(user_id: UserId) -> Option<Requester> {
    i64::try_from(user_id.0).ok().map(Requester)
}

/// Private chat with a requester, where replies and notifications go
pub fn requester_chat(requester: Requester) -> ChatId {
    ChatId(requester.0)
}
