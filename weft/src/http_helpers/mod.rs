#[path = "body.enum.rs"]
mod body;
pub use self::body::Body;

#[path = "http_response.struct.rs"]
mod http_response;
pub use self::http_response::HttpResponse;

#[path = "http_request.struct.rs"]
mod http_request;
pub use self::http_request::{HttpRequest, HttpRequestBuilder};

#[path = "http_method.enum.rs"]
mod http_method;
pub use self::http_method::{HttpMethod, UnknownMethod};

mod http_error;
pub use self::http_error::HttpError;
