//! Typed wrappers for the finance endpoints the app talks to.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::client::{ApiClient, Auth};
use crate::api::models::{ApiResponse, EmptyResponse};
use crate::api::streaming::EventStream;
use crate::error::Result;
use crate::models::{
    total_balance, Account, Budget, ChatMessage, ChatStreamRequest, ChatTone, Insight,
    SaveConversation, SpendingDataPoint, TimePeriod, ToneUpdate, Transaction,
};

pub const ACCOUNTS: &str = "/accounts";
pub const BUDGETS: &str = "/budgets";
pub const RECENT_TRANSACTIONS: &str = "/transactions/recent";
pub const INSIGHTS: &str = "/insights";
pub const SPENDING: &str = "/analytics/spending";
pub const CHAT_HISTORY: &str = "/chat/history";
pub const CHAT_SAVE: &str = "/chat/save";
pub const CHAT_STREAM: &str = "/chat/stream";
pub const USER_PREFERENCES: &str = "/user/preferences";

#[derive(Clone)]
pub struct FinanceApi {
    client: ApiClient,
}

impl FinanceApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.fetch_data(ACCOUNTS).await
    }

    pub async fn total_balance(&self) -> Result<f64> {
        Ok(total_balance(&self.accounts().await?))
    }

    pub async fn budgets(&self) -> Result<Vec<Budget>> {
        self.fetch_data(BUDGETS).await
    }

    pub async fn recent_transactions(&self) -> Result<Vec<Transaction>> {
        self.fetch_data(RECENT_TRANSACTIONS).await
    }

    pub async fn insights(&self) -> Result<Vec<Insight>> {
        self.fetch_data(INSIGHTS).await
    }

    pub async fn spending(&self, period: TimePeriod) -> Result<Vec<SpendingDataPoint>> {
        self.fetch_data(&format!("{}?period={}", SPENDING, period.as_query()))
            .await
    }

    pub async fn chat_history(&self) -> Result<Vec<ChatMessage>> {
        self.fetch_data(CHAT_HISTORY).await
    }

    pub async fn clear_chat_history(&self) -> Result<()> {
        self.client.delete(CHAT_HISTORY, Auth::Required).await
    }

    pub async fn save_conversation(&self, messages: &[ChatMessage]) -> Result<()> {
        let _: EmptyResponse = self
            .client
            .post(CHAT_SAVE, &SaveConversation { messages }, Auth::Required)
            .await?;
        Ok(())
    }

    pub async fn update_tone(&self, tone: ChatTone) -> Result<()> {
        let _: EmptyResponse = self
            .client
            .put(USER_PREFERENCES, &ToneUpdate { chat_tone: tone }, Auth::Required)
            .await?;
        Ok(())
    }

    /// Stream the coach's reply to `message`, given the prior turns.
    pub fn chat(&self, message: &str, tone: ChatTone, history: &[ChatMessage]) -> EventStream {
        let request = ChatStreamRequest::new(message, tone, history);
        self.client.stream(CHAT_STREAM, &request, Auth::Required)
    }

    async fn fetch_data<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response: ApiResponse<T> = self.client.get(endpoint, Auth::Required).await?;
        Ok(response.into_data())
    }
}

/// Running conversation with the chat coach.
///
/// Each `send` appends the user's turn, streams the reply chunk by chunk
/// through `on_chunk`, and appends the assembled reply once the stream
/// ends. On failure the partial reply is discarded and the user's turn
/// stays in the transcript.
pub struct ChatSession {
    api: FinanceApi,
    tone: ChatTone,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(api: FinanceApi, tone: ChatTone) -> Self {
        Self {
            api,
            tone,
            messages: Vec::new(),
        }
    }

    pub fn with_history(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn tone(&self) -> ChatTone {
        self.tone
    }

    pub fn set_tone(&mut self, tone: ChatTone) {
        self.tone = tone;
    }

    /// Returns the assembled reply. If `cancel` fires mid-stream, whatever
    /// arrived so far is kept as the reply.
    pub async fn send<F>(
        &mut self,
        text: &str,
        cancel: Option<CancellationToken>,
        mut on_chunk: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut stream = self.api.chat(text, self.tone, &self.messages);
        if let Some(token) = cancel {
            stream = stream.with_cancellation(token);
        }
        self.messages.push(ChatMessage::user(text));

        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            on_chunk(&chunk);
            reply.push_str(&chunk);
        }

        debug!(chars = reply.len(), "chat reply complete");
        self.messages.push(ChatMessage::ai(reply.clone()));
        Ok(reply)
    }

    /// Persist the transcript server-side.
    pub async fn save(&self) -> Result<()> {
        self.api.save_conversation(&self.messages).await
    }
}
