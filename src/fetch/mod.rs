pub mod client;
pub mod decode;
pub mod request;
pub mod transport;

pub use client::MarketClient;
pub use request::Endpoint;
pub use transport::{HttpError, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
