pub mod response;
pub mod snowflake;
pub mod state;
