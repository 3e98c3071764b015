//! Общие типы backend'а комиссий агентов: агрегаты, DTO, перечисления
//! и результаты расчёта комиссий.

pub mod domain;
pub mod enums;
pub mod shared;
pub mod usecases;
