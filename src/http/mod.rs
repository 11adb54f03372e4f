pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod serializer;
pub mod status;
pub mod version;

pub use headers::{names as header_names, Headers};
pub use parser::{BodyEvent, BodyFraming, ParseError, RequestParser};
pub use request::RequestHead;
pub use response::Response;
pub use serializer::ResponseSerializer;
pub use status::StatusCode;
pub use version::Version;
