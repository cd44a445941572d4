//! External delivery channels for portal notifications.

pub mod email;
