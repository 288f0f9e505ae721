use crate::core::state::{HousingState, StageOutput};

/// 分配流程中的單一步驟。
///
/// `resolve` 不回傳錯誤：任何失敗都會被轉成「沒有結果」(`None`)，
/// 讓流程總是能走到終點。
#[async_trait::async_trait]
pub trait AssignmentStage: Send + Sync {
    async fn resolve(&self, state: &HousingState) -> StageOutput;

    /// 用於日誌標識
    fn get_name(&self) -> &str;
}
