use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GalleryError;

pub const USER_IMAGES_PATH: &str = "/getUserImageUrls";

#[derive(Debug, Clone, Serialize)]
pub struct UserImagesQuery<'a> {
    pub user_id: &'a str,
}

/// One element of the `images` array. Every field falls back to an empty
/// string when it is missing, null or not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_added: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location_taken: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub probability: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_classification: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cropped_image_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserImagesResponse {
    pub images: Vec<ImageRecord>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => value,
        _ => String::new(),
    })
}

pub fn decode_user_images(body: &[u8]) -> Result<Vec<ImageRecord>, GalleryError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| GalleryError::MalformedBody(err.to_string()))?;

    let Some(images) = value.get("images") else {
        return Err(GalleryError::UnexpectedShape(
            "missing field `images`".to_string(),
        ));
    };
    let Some(images) = images.as_array() else {
        return Err(GalleryError::UnexpectedShape(
            "field `images` is not an array".to_string(),
        ));
    };
    if let Some(position) = images.iter().position(|image| !image.is_object()) {
        return Err(GalleryError::UnexpectedShape(format!(
            "images[{position}] is not an object"
        )));
    }

    let response: UserImagesResponse = serde_json::from_value(value)
        .map_err(|err| GalleryError::UnexpectedShape(err.to_string()))?;
    Ok(response.images)
}
