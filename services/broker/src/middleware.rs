use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

/// Build the `x-request-id` layer (UUIDv4 per request). Apply with
/// `.layer(request_id_layer())` in the router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}
