pub mod message_guard;
