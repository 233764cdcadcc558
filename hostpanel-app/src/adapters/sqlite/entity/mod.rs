//! `SeaORM` entities.

pub mod hosting_account;
