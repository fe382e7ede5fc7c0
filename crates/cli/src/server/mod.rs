pub mod dns;

pub use dns::bind_listener;
