//! Merging the several templates one turn may produce.

use std::collections::BTreeMap;

use parley_types::merge::deep_merge;
use parley_types::{Message, MessageValue, OutputTemplate, PlatformOutputTemplate};

/// Merge `outputs` into a single template, in order.
///
/// - `message` and `reprompt` texts are joined with a single space
/// - quick replies are concatenated
/// - `card` and `listen` come from the last template that sets them
/// - per-platform override fields come from the last template that sets
///   them, except native responses, which are deep-merged in order
pub fn merge_templates(outputs: &[OutputTemplate]) -> OutputTemplate {
    match outputs {
        [] => OutputTemplate::default(),
        [single] => single.clone(),
        [first, rest @ ..] => rest.iter().fold(first.clone(), |mut acc, next| {
            merge_into(&mut acc, next);
            acc
        }),
    }
}

fn merge_into(acc: &mut OutputTemplate, next: &OutputTemplate) {
    acc.message = join_messages(acc.message.take(), next.message.as_ref());
    acc.reprompt = join_messages(acc.reprompt.take(), next.reprompt.as_ref());

    if let Some(replies) = &next.quick_replies {
        acc.quick_replies
            .get_or_insert_with(Vec::new)
            .extend(replies.iter().cloned());
    }
    if next.card.is_some() {
        acc.card.clone_from(&next.card);
    }
    if next.listen.is_some() {
        acc.listen.clone_from(&next.listen);
    }

    if let Some(platforms) = &next.platforms {
        let target = acc.platforms.get_or_insert_with(BTreeMap::new);
        for (name, over) in platforms {
            merge_platform(target.entry(name.clone()).or_default(), over);
        }
    }
}

fn merge_platform(acc: &mut PlatformOutputTemplate, next: &PlatformOutputTemplate) {
    if next.message.is_some() {
        acc.message.clone_from(&next.message);
    }
    if next.reprompt.is_some() {
        acc.reprompt.clone_from(&next.reprompt);
    }
    if next.listen.is_some() {
        acc.listen.clone_from(&next.listen);
    }
    if next.quick_replies.is_some() {
        acc.quick_replies.clone_from(&next.quick_replies);
    }
    if next.card.is_some() {
        acc.card.clone_from(&next.card);
    }
    if let Some(native) = &next.native_response {
        match &mut acc.native_response {
            Some(existing) => deep_merge(existing, native),
            None => acc.native_response = Some(native.clone()),
        }
    }
}

/// Join two messages with a space. Plain texts stay plain; if either side
/// is structured the result is structured, with display texts joined too.
fn join_messages(acc: Option<MessageValue>, next: Option<&MessageValue>) -> Option<MessageValue> {
    let Some(next) = next else {
        return acc;
    };
    let Some(acc) = acc else {
        return Some(next.clone());
    };

    Some(match (&acc, next) {
        (MessageValue::Text(a), MessageValue::Text(b)) => MessageValue::Text(format!("{a} {b}")),
        _ => MessageValue::Structured(Message {
            text: format!("{} {}", acc.text(), next.text()),
            display_text: Some(format!("{} {}", acc.display_text(), next.display_text())),
        }),
    })
}
