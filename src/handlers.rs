use actix_web::{error::UrlencodedError, web, HttpResponse};

use crate::errors::ServerError;

pub mod note;

const INDEX_PAGE: &str = include_str!("../public/index.html");
const NOTE_PAGE: &str = include_str!("../public/note.html");

pub async fn index() -> impl actix_web::Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_PAGE)
}

pub async fn note_page() -> impl actix_web::Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(NOTE_PAGE)
}

/// Form extractor settings for note submissions; limit errors still render
/// as HTML fragments.
pub fn form_config(limit: usize) -> web::FormConfig {
    web::FormConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            log::debug!("rejected note submission: {err}");
            match err {
                UrlencodedError::Overflow { .. } => ServerError::PayloadTooLarge.into(),
                _ => ServerError::UserError("malformed note submission").into(),
            }
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/note/{id}", web::get().to(note_page))
        .route("/notes", web::post().to(note::new))
        .route("/share/{id}", web::get().to(note::share));
}
