pub mod cd;
pub mod printenv;
pub mod exit;
pub mod export;
pub mod pwd;
pub mod unset;
