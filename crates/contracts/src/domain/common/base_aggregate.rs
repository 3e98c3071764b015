use super::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

/// Базовый агрегат с обязательными полями для всех агрегатов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAggregate<Id> {
    pub id: Id,
    /// Бизнес-код записи (например, "RULE-1b4e28ba", "#1001")
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub metadata: EntityMetadata,
}

impl<Id> BaseAggregate<Id> {
    pub fn new(id: Id, code: String, description: String) -> Self {
        Self {
            id,
            code,
            description,
            comment: None,
            metadata: EntityMetadata::new(),
        }
    }

    /// Создать агрегат с существующими метаданными (для загрузки из БД)
    pub fn with_metadata(
        id: Id,
        code: String,
        description: String,
        comment: Option<String>,
        metadata: EntityMetadata,
    ) -> Self {
        Self {
            id,
            code,
            description,
            comment,
            metadata,
        }
    }

    pub fn touch(&mut self) {
        self.metadata.touch();
    }
}

impl<Id: AggregateId> BaseAggregate<Id> {
    /// Создать агрегат с кодом вида "{prefix}-{первые 8 символов id}"
    pub fn with_generated_code(id: Id, prefix: &str, description: String) -> Self {
        let code = format!("{}-{}", prefix, id.short());
        Self::new(id, code, description)
    }
}
