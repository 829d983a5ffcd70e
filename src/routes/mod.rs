pub mod health;
pub mod live_price;
pub mod predictions;
