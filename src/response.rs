use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderValue};
use http::Response;

use crate::object::StoredObject;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Wraps a fetched object in an HTTP response carrying its content type and
/// `Cache-Control: private`.
pub fn object_response(object: &StoredObject) -> Response<Bytes> {
    let mut response = Response::new(object.body.clone());

    let content_type = object.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("private"));

    response
}

/// As [`object_response`], plus a `Content-Disposition` header forcing a
/// download under the given filename.
pub fn download_response(object: &StoredObject, file_name: &str) -> Response<Bytes> {
    let mut response = object_response(object);

    // Quotes in the filename would break the quoted-string form.
    let file_name = file_name.replace('"', "");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\";"))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    response.headers_mut().insert(CONTENT_DISPOSITION, disposition);

    response
}
