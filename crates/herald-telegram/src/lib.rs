//! `herald-telegram` — the Telegram command surface and outbound transport.
//!
//! Updates arrive over the gateway's webhook route (no long-polling
//! dispatcher); [`handler::CommandHandler`] turns them into store
//! operations and reply text, and [`transport::TelegramSender`] is the
//! production [`herald_sweep::MessageTransport`] used for reminder
//! notifications.

pub mod allow;
pub mod commands;
pub mod handler;
pub mod send;
pub mod transport;

pub use handler::CommandHandler;
pub use transport::TelegramSender;
