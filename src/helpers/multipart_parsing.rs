use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

pub struct MultipartFile {
    pub data: Vec<u8>,
    pub ext: String,
}

pub struct ParsedMultipart<D> {
    pub files: HashMap<String, MultipartFile>,
    pub data: Option<D>, // JSON part of the multipart
}

pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "video/mpeg" => Some("mpeg"),
        "video/mp4" => Some("mp4"),
        "video/mkv" => Some("mkv"),
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpeg"),
        _ => None,
    }
}

/*
    Drains a multipart payload into memory: the application/json part is
    deserialized into D, every other part is kept as raw bytes under its
    form-field name.
*/
pub async fn attempt_parse_multipart<D: DeserializeOwned>(
    mut multipart: Multipart,
) -> Result<ParsedMultipart<D>, &'static str> {
    let mut parsed_multipart: ParsedMultipart<D> = ParsedMultipart {
        files: HashMap::new(),
        data: None,
    };

    while let Ok(Some(mut field)) = multipart.try_next().await {
        let mime = field.content_type().to_string();

        let mut data: Vec<u8> = Vec::new();

        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|_| "Failed to read multipart chunk")?;
            data.extend_from_slice(&bytes);
        }

        if mime == "application/json" {
            let text = std::str::from_utf8(&data).map_err(|_| "JSON part is not UTF-8")?;

            let value: D = serde_json::from_str(text).map_err(|_| "Failed to deserialize JSON")?;
            parsed_multipart.data = Some(value);
        } else {
            let ext = extension_for_mime(&mime).ok_or("Unsupported content type")?;

            let name = field
                .content_disposition()
                .and_then(|cd| cd.get_name().map(String::from))
                .ok_or("File part has no field name")?;

            let multipart_file = MultipartFile {
                data,
                ext: ext.to_string(),
            };

            parsed_multipart.files.insert(name, multipart_file);
        }
    }

    Ok(parsed_multipart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_mime_types_map_to_extensions() {
        assert_eq!(extension_for_mime("video/mp4"), Some("mp4"));
        assert_eq!(extension_for_mime("image/png"), Some("png"));
        assert_eq!(extension_for_mime("application/pdf"), None);
    }
}
