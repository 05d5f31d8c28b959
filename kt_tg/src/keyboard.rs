use kt_core::ReplyAction;
use teloxide::types::InlineKeyboardButton;
use teloxide::types::InlineKeyboardMarkup;

/// Single-button keyboard whose callback data is the follow-up command text
pub fn action_keyboard(action: &ReplyAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback(action.label.clone(), action.command.clone())]])
}
