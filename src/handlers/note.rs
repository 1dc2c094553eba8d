use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{
    errors::ServerError,
    models::note::NewNote,
    store::NoteStore,
    utils::{escape_html, request_origin},
};

fn html(builder: &mut actix_web::HttpResponseBuilder, body: String) -> HttpResponse {
    builder.content_type("text/html; charset=utf-8").body(body)
}

pub async fn new(
    req: HttpRequest,
    input: web::Form<NewNote>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let note_content = input
        .content()
        .ok_or(ServerError::UserError("note content is empty"))?;

    let note_id = Uuid::new_v4().to_string();
    store.create(&note_id, note_content).await?;
    log::info!("created note {note_id}");

    let link = format!("{}/note/{}", request_origin(&req), note_id);
    Ok(html(
        &mut HttpResponse::Created(),
        format!(
            "<p>\n  Share your note with this link\n  <br />\n  <span>{}</span>\n</p>",
            escape_html(&link)
        ),
    ))
}

pub async fn share(
    note_id: web::Path<String>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    match store.open(&note_id).await? {
        Some(note) => Ok(html(
            &mut HttpResponse::Ok(),
            format!("<pre>{}</pre>", escape_html(&note.content)),
        )),
        None => Ok(html(
            &mut HttpResponse::NotFound(),
            "<span class='error'>Note not found!</span>".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        web, App,
    };
    use chrono::Duration;

    use crate::store::tests::{test_store, ManualClock};

    fn link_id(body: &str) -> String {
        let start = body.find("/note/").unwrap() + "/note/".len();
        let rest = &body[start..];
        rest[..rest.find('<').unwrap()].to_string()
    }

    #[actix_web::test]
    async fn submit_then_share() {
        let store = test_store(ManualClock::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .configure(crate::handlers::routes),
        )
        .await;

        let req = TestRequest::post()
            .uri("/notes")
            .insert_header(("origin", "http://localhost:3000"))
            .set_form([("content", "hello <world>")])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        assert!(body.contains("http://localhost:3000/note/"));

        let id = link_id(&body);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(store.read(&id).await.unwrap().unwrap().opened_at.is_none());

        let req = TestRequest::get().uri(&format!("/share/{id}")).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, "<pre>hello &lt;world&gt;</pre>");

        assert!(store.read(&id).await.unwrap().unwrap().is_opened());
    }

    #[actix_web::test]
    async fn large_notes_are_accepted() {
        let store = test_store(ManualClock::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(crate::handlers::form_config(100 * 1024))
                .configure(crate::handlers::routes),
        )
        .await;

        let big = "a".repeat(20_000);
        let req = TestRequest::post()
            .uri("/notes")
            .insert_header(("origin", "http://localhost:3000"))
            .set_form([("content", big.as_str())])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
        let note = store.read(&link_id(&body)).await.unwrap().unwrap();
        assert_eq!(note.content.len(), 20_000);
    }

    #[actix_web::test]
    async fn oversized_notes_get_an_error_fragment() {
        let store = test_store(ManualClock::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .app_data(crate::handlers::form_config(1024))
                .configure(crate::handlers::routes),
        )
        .await;

        let big = "a".repeat(2048);
        let req = TestRequest::post()
            .uri("/notes")
            .set_form([("content", big.as_str())])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = test::read_body(res).await;
        assert_eq!(body, "<span class='error'>Note is too large!</span>");
    }

    #[actix_web::test]
    async fn empty_content_is_rejected() {
        let store = test_store(ManualClock::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .configure(crate::handlers::routes),
        )
        .await;

        let req = TestRequest::post()
            .uri("/notes")
            .set_form([("content", "   ")])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_and_expired_notes_are_not_found() {
        let clock = ManualClock::new();
        let store = test_store(clock.clone());
        store.create("abc", "hello").await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .configure(crate::handlers::routes),
        )
        .await;

        let req = TestRequest::get().uri("/share/nope").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::get().uri("/share/abc").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        clock.advance(Duration::minutes(6));
        let req = TestRequest::get().uri("/share/abc").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(res).await;
        assert_eq!(body, "<span class='error'>Note not found!</span>");
    }

    #[actix_web::test]
    async fn pages_are_served() {
        let store = test_store(ManualClock::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .configure(crate::handlers::routes),
        )
        .await;

        for uri in ["/", "/note/abc"] {
            let req = TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }
}
