pub mod client_info;
pub mod extract_host;
pub mod password;
