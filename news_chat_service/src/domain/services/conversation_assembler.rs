use crate::domain::entities::{chat_exchange::ChatExchange, conversation_turn::ConversationTurn};

/// Builds the conversation sent to the generative model:
/// one system turn per retrieved context text, in order, then the user question.
///
/// The size of the window is not bounded here, the generative client trims it before sending.
pub fn assemble(context_texts: &[String], user_message: &str) -> Vec<ConversationTurn> {
    context_texts
        .iter()
        .map(|text| ConversationTurn::system(text.as_str()))
        .chain(std::iter::once(ConversationTurn::user(user_message)))
        .collect()
}

/// Same as `assemble`, with the most recent exchanges of the session replayed first,
/// bounded to `max_turns` turns.
///
/// Exchanges are kept whole. When history is present at least the last exchange is kept,
/// and the least similar context texts are dropped to make room for it.
pub fn assemble_with_history(
    history: &[ChatExchange],
    context_texts: &[String],
    user_message: &str,
    max_turns: usize,
) -> Vec<ConversationTurn> {
    // The user question always takes one turn
    let budget = max_turns.saturating_sub(1);

    let mut exchanges = budget.saturating_sub(context_texts.len()) / 2;
    if exchanges == 0 && budget >= 2 {
        exchanges = 1;
    }
    let exchanges = exchanges.min(history.len());
    let context_len = context_texts.len().min(budget - 2 * exchanges);

    history[history.len() - exchanges..]
        .iter()
        .flat_map(|exchange| {
            [
                ConversationTurn::user(exchange.user.as_str()),
                ConversationTurn::model(exchange.bot.as_str()),
            ]
        })
        .chain(assemble(&context_texts[..context_len], user_message))
        .collect()
}
