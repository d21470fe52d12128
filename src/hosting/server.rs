use super::Arena;
use super::Config;
use super::OpenBoard;
use super::OpenFlip;
use super::PlayQuery;
use super::Sweep;
use crate::SessionId;
use crate::UserId;
use crate::ledger::Bank;
use crate::notify::Inbox;
use crate::room::Entropy;
use crate::room::Hub;
use crate::session::Status;
use crate::store::Store;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> anyhow::Result<()> {
        let store = Arc::new(Store::default());
        let arena = web::Data::new(Arena::new(
            store.clone(),
            Arc::new(Bank::new(config.opening_balance)),
            Arc::new(Inbox::default()),
            Arc::new(Hub::default()),
            Arc::new(Entropy),
            config.max_stake,
        ));
        Sweep::spawn(
            store,
            std::time::Duration::from_secs(config.sweep_secs),
            chrono::Duration::hours(config.expire_hours),
        );
        log::info!("starting server on {}", config.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(arena.clone())
                .route("/flips", web::post().to(open_flip))
                .route("/boards", web::post().to(open_board))
                .route("/sessions/{id}", web::get().to(snapshot))
                .route("/lobby/{user}", web::get().to(lobby))
                .route("/play/{id}", web::get().to(play))
        })
        .workers(config.workers)
        .bind(&config.bind)?
        .run()
        .await?;
        Ok(())
    }
}

async fn open_flip(arena: web::Data<Arena>, req: web::Json<OpenFlip>) -> impl Responder {
    match arena
        .open_flip(req.initiator, req.invitee, req.stake, req.choice)
        .await
    {
        Ok(session) => HttpResponse::Ok().json(serde_json::json!({ "session_id": session.id() })),
        Err(refusal) => HttpResponse::BadRequest().body(refusal.to_string()),
    }
}

async fn open_board(arena: web::Data<Arena>, req: web::Json<OpenBoard>) -> impl Responder {
    match arena
        .open_board(req.initiator, req.invitee, req.stake, req.pref)
        .await
    {
        Ok(session) => HttpResponse::Ok().json(serde_json::json!({ "session_id": session.id() })),
        Err(refusal) => HttpResponse::BadRequest().body(refusal.to_string()),
    }
}

async fn snapshot(arena: web::Data<Arena>, path: web::Path<SessionId>) -> impl Responder {
    match arena.store().get(path.into_inner()).await {
        Some(session) => HttpResponse::Ok().json(session),
        None => HttpResponse::NotFound().body("session not found"),
    }
}

async fn lobby(arena: web::Data<Arena>, path: web::Path<UserId>) -> impl Responder {
    let user = path.into_inner();
    let store = arena.store();
    let pending = store.involving(user, Status::Pending).await;
    let active = store.involving(user, Status::Active).await;
    let recent = store
        .involving(user, Status::Completed)
        .await
        .into_iter()
        .take(10)
        .collect::<Vec<_>>();
    HttpResponse::Ok().json(serde_json::json!({
        "pending": pending,
        "active": active,
        "recent": recent,
    }))
}

async fn play(
    arena: web::Data<Arena>,
    path: web::Path<SessionId>,
    query: web::Query<PlayQuery>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let id = path.into_inner();
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            match Arena::bridge(arena.into_inner(), id, query.user, session, stream).await {
                Ok(()) => response.map_into_left_body(),
                Err(e) => HttpResponse::NotFound()
                    .body(e.to_string())
                    .map_into_right_body(),
            }
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}
