pub mod apachelog;
pub mod auth;
pub mod config;
pub mod context;
pub mod easy_fs;
pub mod engine;
pub mod handler;
pub mod http_request_method;
pub mod http_response_status_codes;
pub mod path;
pub mod portal;
pub mod render;
pub mod resolver;
pub mod rouille_util;
pub mod router;
pub mod server;
pub mod theme;
pub mod time_guard;
pub mod util;
pub mod webutils;
