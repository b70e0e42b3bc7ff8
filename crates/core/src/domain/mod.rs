pub mod forecast;
pub mod month;
pub mod sales;
