use serde::{Deserialize, Serialize};

/// Метаданные экземпляра агрегата (lifecycle tracking)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityMetadata {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Мягкое удаление (soft delete)
    pub is_deleted: bool,
    /// Проведен (для документов)
    pub is_posted: bool,
    /// Версия для optimistic locking
    pub version: i32,
}

impl EntityMetadata {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            is_deleted: false,
            is_posted: false,
            version: 0,
        }
    }

    /// Обновить timestamp
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }

    /// Обновить timestamp и увеличить версию (перед записью с проверкой версии)
    pub fn bump(&mut self) -> i32 {
        let previous = self.version;
        self.touch();
        self.version += 1;
        previous
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_returns_previous_version() {
        let mut meta = EntityMetadata::new();
        assert_eq!(meta.bump(), 0);
        assert_eq!(meta.bump(), 1);
        assert_eq!(meta.version, 2);
        assert!(meta.updated_at >= meta.created_at);
    }
}
