use super::*;
use crate::error::UploadError;
use actix_multipart::{Field, Multipart};
use actix_web::{dev, error, web, Error as ActixWebError, FromRequest, HttpRequest};
use futures::{
    future::{Future, TryFutureExt},
    stream::TryStreamExt,
};

use std::io::Write;

impl FromRequest for Parts {
    type Error = ActixWebError;
    type Future = std::pin::Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let opt_cfg = req.app_data::<web::Data<PartsConfig>>().cloned();

        Box::pin(Multipart::from_request(req, payload).and_then(move |mp| {
            mp.map_err(ActixWebError::from)
                .and_then(move |field| handle_field(opt_cfg.clone(), field))
                .try_collect::<Vec<_>>()
                .map_ok(|parts| {
                    let mut texts = Vec::with_capacity(parts.len());
                    let mut files = Vec::with_capacity(parts.len());
                    for (name, p) in parts.into_iter() {
                        match p {
                            Part::Text(s) => {
                                texts.push((name, s));
                            }
                            Part::File(f) => {
                                files.push((name, f));
                            }
                        }
                    }
                    Parts { texts: TextParts(texts), files: FileParts(files) }
                })
        }))
    }
}

async fn new_temp_file(
    opt_cfg: Option<web::Data<PartsConfig>>,
) -> Result<NamedTempFile, ActixWebError> {
    web::block(move || match opt_cfg.as_ref().and_then(|x| x.temp_dir.as_ref()) {
        Some(temp_dir) => NamedTempFile::new_in(temp_dir),
        _ => NamedTempFile::new(),
    })
    .await
    .map_err(fault)?
    .map_err(fault)
}

/// Temp file faults get the same generic 500 and error log as the handler's
fn fault<E: Into<UploadError>>(e: E) -> ActixWebError {
    ActixWebError::from(e.into())
}

async fn handle_field(
    opt_cfg: Option<web::Data<PartsConfig>>,
    mut field: Field,
) -> Result<(String, Part), ActixWebError> {
    let disposition = field.content_disposition();

    let name = match disposition.get_name() {
        Some(s) => s.to_owned(),
        None => {
            return Err(error::ErrorInternalServerError("Field name is required"));
        }
    };
    let file_name_opt = disposition.get_filename().map(ToOwned::to_owned);

    let content_type = field.content_type().cloned();

    let marked_as_text = opt_cfg.as_ref().map(|x| x.is_text_field(&name)).unwrap_or(false);

    let mut buffer = match file_name_opt.as_ref() {
        Some(_) if !marked_as_text => new_temp_file(opt_cfg.clone()).map_ok(Buffer::File).await?,
        _ => Buffer::Cursor(Cursor::new(Vec::new())),
    };

    while let Some(bytes) = field.try_next().await? {
        buffer = match buffer {
            Buffer::Cursor(mut cursor) => {
                cursor.write_all(bytes.as_ref()).map_err(fault)?;
                Buffer::Cursor(cursor)
            }
            Buffer::File(mut file) => web::block(move || {
                file.write_all(bytes.as_ref()).map(|_| Buffer::File(file))
            })
            .await
            .map_err(fault)?
            .map_err(fault)?,
        };
    }

    match buffer {
        Buffer::Cursor(cursor) => Ok((name, Part::Text(Bytes::from(cursor.into_inner())))),
        Buffer::File(file) => {
            Ok((name, Part::File(File::new(file, file_name_opt, content_type.as_ref()))))
        }
    }
}
