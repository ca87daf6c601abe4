// Adapters layer: concrete implementations of the domain ports (LLM, email, terminal).

pub mod openai;
pub mod resend;
#[cfg(feature = "cli")]
pub mod terminal;
