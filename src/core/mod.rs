pub mod budget;
pub mod financials;
pub mod graph;
pub mod intent;
pub mod notify;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::ports::{Agent, ChatClient, Mailer, Prompter, Storage};
pub use crate::utils::error::Result;
