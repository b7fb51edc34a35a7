pub mod debt;
pub mod quick;
pub mod underwrite;
