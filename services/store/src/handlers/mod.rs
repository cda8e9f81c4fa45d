pub mod cart;
pub mod guard;
pub mod health;
pub mod token;
pub mod user;
