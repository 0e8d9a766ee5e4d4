mod api;
mod transport;

pub use api::{decode_response, error_for_status, HttpClient};
pub use transport::{
    ApiRequest, ApiResponse, FilePart, Method, MockResponse, MockTransport, MultipartForm,
    ReqwestTransport, ReqwestTransportBuilder, RequestBody, Transport,
};
