use crate::domain::model::ChatMessage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 外部文字生成服務（LLM）。輸入對話訊息，回傳完整的文字回覆。
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[async_trait]
impl<O: Oracle + ?Sized> Oracle for Arc<O> {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(messages).await
    }
}
