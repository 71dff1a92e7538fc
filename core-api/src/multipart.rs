//! Minimal multipart/form-data encoding for the image upload endpoint.
//!
//! The backend expects a single `image` part. Only what that endpoint needs
//! is implemented; this is not a general multipart writer.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// An encoded multipart body plus the Content-Type header value carrying
/// its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub content_type: String,
    pub body: Bytes,
}

/// Encode a single file part under `field_name`.
pub fn file_part(
    field_name: &str,
    file_name: &str,
    mime_type: &str,
    content: &[u8],
) -> MultipartBody {
    let boundary = format!("leafguard-{}", Uuid::new_v4().simple());

    let mut buf = BytesMut::with_capacity(content.len() + 256);
    buf.put_slice(format!("--{}\r\n", boundary).as_bytes());
    buf.put_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, file_name
        )
        .as_bytes(),
    );
    buf.put_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    buf.put_slice(content);
    buf.put_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={}", boundary),
        body: buf.freeze(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_carries_boundary() {
        let part = file_part("image", "plant.jpg", "image/jpeg", b"bytes");

        let boundary = part
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("content type prefix");
        assert!(boundary.starts_with("leafguard-"));
    }

    #[test]
    fn test_body_structure() {
        let part = file_part("image", "plant.jpg", "image/jpeg", b"JPEGDATA");
        let body = String::from_utf8(part.body.to_vec()).unwrap();

        assert!(body.contains("Content-Disposition: form-data; name=\"image\"; filename=\"plant.jpg\""));
        assert!(body.contains("Content-Type: image/jpeg"));
        assert!(body.contains("JPEGDATA"));
        // Closing delimiter
        assert!(body.trim_end().ends_with("--"));
    }

    #[test]
    fn test_boundaries_are_unique_per_body() {
        let a = file_part("image", "a.jpg", "image/jpeg", b"a");
        let b = file_part("image", "b.jpg", "image/jpeg", b"b");
        assert_ne!(a.content_type, b.content_type);
    }
}
