pub mod inspect;
pub mod minimize;
