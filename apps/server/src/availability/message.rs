//! Customer-facing text built from an availability outcome.

use chrono::NaiveDateTime;

use super::checker::UnavailableReason;

fn format_slot(slot: &NaiveDateTime) -> String {
    slot.format("%A, %d.%m.%Y at %H:%M").to_string()
}

/// Explanation plus a bullet list of alternatives. Derived only from the
/// reason and the slots, so it can be regenerated at any time.
pub fn compose_message(
    craftsman_name: &str,
    requested: &NaiveDateTime,
    reason: Option<&UnavailableReason>,
    alternatives: &[NaiveDateTime],
) -> String {
    let Some(reason) = reason else {
        return format!(
            "{} is available on {}.",
            craftsman_name,
            format_slot(requested)
        );
    };

    let mut message = format!(
        "Unfortunately {} is not available on {} ({}).",
        craftsman_name,
        format_slot(requested),
        reason
    );

    if alternatives.is_empty() {
        message.push_str(" No free appointments were found in the coming days.");
        return message;
    }

    message.push_str("\n\nWe can offer the following appointments instead:");
    for slot in alternatives {
        message.push_str("\n- ");
        message.push_str(&format_slot(slot));
    }
    message
}
