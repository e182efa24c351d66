/// Inbound event parsing.
pub mod inbound;
/// Text rendering of room messages.
pub mod messages;
/// Outbound message envelope handed to the notifier.
pub mod outbound;
