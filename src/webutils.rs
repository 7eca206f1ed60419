use anyhow::Error;
use rouille::Response;

use crate::http_response_status_codes::HttpResponseStatusCode;


pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    let title = status.title();
    let explanation = status.desc();
    let resp = format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>\
                        <p>{explanation}</p></body></html>\n");
    Response::html(resp).with_status_code(status.code())
}

/// The error itself is only logged, never sent to the client.
pub fn errorpage_from_error(err: &Error) -> Response {
    let status = HttpResponseStatusCode::InternalServerError500;
    log::error!("error in page (returning {status:?}): {err:#}");
    errorpage_from_status(status)
}

pub fn htmlresponse(status: HttpResponseStatusCode, body: String) -> Response {
    Response::html(body).with_status_code(status.code())
}
