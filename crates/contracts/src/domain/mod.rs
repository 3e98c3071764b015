pub mod a001_commission_rule;
pub mod a002_agent;
pub mod a003_shop_order;
pub mod a004_commission;
pub mod common;
