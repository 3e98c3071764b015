pub mod commission_status;
pub mod rule_status;
pub mod rule_type;
