mod reply_buffer;
pub mod reply_builder;

pub use reply_buffer::ReplyBuffer;
pub use reply_builder::{build_reply, build_static_answer, STATIC_ANSWER_TTL};
