//! Outbound notifications for accepted releases.

pub mod discord;

pub use discord::DiscordNotifier;
