//! Handler modules following the `register` convention.

pub mod audit;
pub mod todos;
