pub mod api_credentials;
pub mod fyers_tokens;
pub mod users;
