use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор агента
    AgentId
);

/// Агент продаж: покупатель Shopify, которому начисляются комиссии
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(flatten)]
    pub base: BaseAggregate<AgentId>,

    /// ID покупателя в Shopify
    #[serde(rename = "customerId")]
    pub customer_id: String,

    pub email: Option<String>,

    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl Agent {
    pub fn new_for_insert(
        name: String,
        customer_id: String,
        email: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::with_generated_code(AgentId::new_v4(), "AGT", name);
        base.comment = comment;
        Self {
            base,
            customer_id,
            email,
            is_active: true,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Имя агента (хранится в description)
    pub fn name(&self) -> &str {
        &self.base.description
    }

    pub fn update(&mut self, dto: &AgentDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.name.clone();
        self.base.comment = dto.comment.clone();
        self.customer_id = dto.customer_id.clone();
        self.email = dto.email.clone();
        self.is_active = dto.is_active.unwrap_or(self.is_active);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Имя агента не может быть пустым".into());
        }
        if self.customer_id.trim().is_empty() {
            return Err("ID покупателя Shopify не может быть пустым".into());
        }
        if let Some(email) = self.email.as_ref().filter(|e| !e.trim().is_empty()) {
            if !email.contains('@') {
                return Err("Некорректный email".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Agent {
    type Id = AgentId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "agent"
    }

    fn element_name() -> &'static str {
        "Агент"
    }

    fn list_name() -> &'static str {
        "Агенты"
    }
}

/// DTO для создания/обновления агента
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub email: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub comment: Option<String>,
}
