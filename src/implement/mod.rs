pub mod service_http;
