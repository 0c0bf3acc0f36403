pub mod complete;
pub mod inspect;
