pub mod chat_llm;
pub mod db;
pub mod storage;

pub use chat_llm::OpenAiChatAdapter;
pub use db::PgStore;
pub use storage::S3MediaStorage;
