use base64::{engine::general_purpose, Engine as _};

/// Encodes raw image bytes wholly in memory as a `data:` URI. The result is
/// stored directly in the profile record's `profile_pic_url` field.
pub fn encode_image_data_uri(data: &[u8], content_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(data)
    )
}
