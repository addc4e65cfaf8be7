use actix_web::{http::header::ContentType, web, HttpResponse};
use chrono::Utc;

use crate::error::UploadError;
use crate::parts::Parts;
use crate::record::UploadRecord;
use crate::store::UploadStore;

pub const IMAGE_FIELD: &str = "image";
pub const TEXT_FIELD: &str = "text";

/// `POST /upload`
///
/// The first `image` file is stored before the label is checked, so a request
/// without `text` still leaves its image behind. Only a complete request gets
/// a sidecar. An empty label counts as missing.
pub async fn upload(
    mut parts: Parts,
    store: web::Data<UploadStore>,
) -> Result<HttpResponse, UploadError> {
    let image = match parts.files.remove(IMAGE_FIELD).into_iter().next() {
        Some(file) => {
            let store = store.clone();
            let now = Utc::now();
            Some(web::block(move || store.persist_image(file, now)).await??)
        }
        None => None,
    };

    let text = parts
        .texts
        .remove(TEXT_FIELD)
        .into_iter()
        .next()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .filter(|text| !text.is_empty());

    let (image, text) = match (image, text) {
        (Some(image), Some(text)) => (image, text),
        _ => return Err(UploadError::MissingField),
    };

    let record = UploadRecord::new(image.filename, text, Utc::now());
    let record = web::block(move || store.write_record(&record).map(|_| record)).await??;

    log::info!("Received: {}, Label: \"{}\"", record.filename, record.text);

    Ok(HttpResponse::Ok().content_type(ContentType::plaintext()).body("Upload successful"))
}
