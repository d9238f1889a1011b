use std::any::Any;

/// Shortens long text (usually sql) to a printable prefix.
#[macro_export]
macro_rules! truncate_long {
    ($text:expr) => {
        format_args!(
            "{}{}",
            &$text[..$text
                .char_indices()
                .nth(497)
                .map(|(i, _)| i)
                .unwrap_or($text.len())]
                .trim_end(),
            if $text.chars().count() > 497 { "..." } else { "" },
        )
    };
}

/// Extracts the message of a panic payload, when it carries one.
pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic payload".to_string()
    }
}
