//! In-memory doubles for the domain ports, shared by the unit tests.

use crate::domain::chat::{ChatMessage, ChatRequest, FunctionCall, ToolCall};
use crate::domain::model::Email;
use crate::domain::ports::{ChatClient, Mailer, Prompter};
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned replies in order and records every request.
#[derive(Default)]
pub struct StubChatClient {
    replies: Mutex<VecDeque<Result<ChatMessage>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl StubChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ChatMessage::assistant(text)));
        self
    }

    pub fn reply_tool_call(self, name: &str, arguments: &str) -> Self {
        let message = ChatMessage {
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: format!("call_{}", name),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }]),
            ..ChatMessage::assistant("")
        };
        self.replies.lock().unwrap().push_back(Ok(message));
        self
    }

    pub fn reply_error(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(ShopperError::LlmError {
            message: message.to_string(),
        }));
        self
    }

    pub fn request(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for StubChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatMessage> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ShopperError::LlmError {
                message: "no scripted reply left".to_string(),
            }))
    }
}

/// Answers questions from a script and remembers what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    confirmations: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str], confirmations: &[bool]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            confirmations: confirmations.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        self.asked.push(question.to_string());
        let answer = self.answers.pop_front().ok_or(ShopperError::Aborted)?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.asked.push(question.to_string());
        self.confirmations.pop_front().ok_or(ShopperError::Aborted)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        if self.fail {
            return Err(ShopperError::NotificationError {
                message: "mail server unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
